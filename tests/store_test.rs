use std::cell::RefCell;
use std::rc::Rc;
use talho::store::{FieldId, MAX_CASCADE_DEPTH, Store, StoreBuilder, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum F {
    A,
    B,
    C,
    Sum,
}

impl FieldId for F {
    const ALL: &'static [Self] = &[F::A, F::B, F::C, F::Sum];
}

type Log = Rc<RefCell<Vec<String>>>;

fn base() -> StoreBuilder<F, i64> {
    StoreBuilder::new()
        .stored(F::A, 0)
        .stored(F::B, 0)
        .stored(F::C, 0)
        .derived(F::Sum, |s: &Store<F, i64>| s.get(F::A) + s.get(F::B) + s.get(F::C))
}

#[test]
fn get_returns_last_set_value() {
    let mut store = base().build().unwrap();
    assert_eq!(store.get(F::A), 0);
    store.set(F::A, 7).unwrap();
    assert_eq!(store.get(F::A), 7);
    assert_eq!(store.peek(F::A), Some(&7));
}

#[test]
fn derived_fields_recompute_on_read() {
    let mut store = base().build().unwrap();
    store.set(F::A, 1).unwrap();
    store.set(F::B, 2).unwrap();
    assert_eq!(store.get(F::Sum), 3);
    store.set(F::C, 10).unwrap();
    assert_eq!(store.get(F::Sum), 13);
    assert!(store.is_derived(F::Sum));
    assert_eq!(store.peek(F::Sum), None);
}

#[test]
fn writing_a_derived_field_is_rejected() {
    let mut store = base().build().unwrap();
    assert!(matches!(store.set(F::Sum, 1), Err(StoreError::DerivedField(_))));
}

#[test]
fn builder_rejects_inconsistent_tables() {
    let ambiguous = base().stored(F::Sum, 0).build();
    assert!(matches!(ambiguous, Err(StoreError::Ambiguous(_))));

    let missing = StoreBuilder::<F, i64>::new()
        .stored(F::A, 0)
        .stored(F::B, 0)
        .derived(F::Sum, |_| 0)
        .build();
    assert!(matches!(missing, Err(StoreError::Missing(name)) if name == "C"));

    let effect_on_derived = base().effect(F::Sum, |_, _| Ok(())).build();
    assert!(matches!(effect_on_derived, Err(StoreError::EffectOnDerived(_))));
}

#[test]
fn effects_run_in_registration_order() {
    let log: Log = Rc::default();
    let (l1, l2) = (log.clone(), log.clone());
    let mut store = base()
        .effect(F::A, move |_, v| {
            l1.borrow_mut().push(format!("first {}", v));
            Ok(())
        })
        .effect(F::A, move |_, v| {
            l2.borrow_mut().push(format!("second {}", v));
            Ok(())
        })
        .build()
        .unwrap();

    assert_eq!(store.effects(F::A), 2);
    store.set(F::A, 4).unwrap();
    assert_eq!(*log.borrow(), vec!["first 4", "second 4"]);
}

#[test]
fn cascades_run_depth_first_before_set_returns() {
    let log: Log = Rc::default();
    let (la, lb, lc) = (log.clone(), log.clone(), log.clone());
    let mut store = base()
        .effect(F::A, move |s, v| {
            la.borrow_mut().push("A start".to_string());
            s.set(F::B, v * 2)?;
            la.borrow_mut().push("A end".to_string());
            Ok(())
        })
        .effect(F::B, move |s, v| {
            lb.borrow_mut().push(format!("B depth {}", s.depth()));
            s.set(F::C, v + 1)
        })
        .effect(F::C, move |s, _| {
            lc.borrow_mut().push(format!("C depth {}", s.depth()));
            Ok(())
        })
        .build()
        .unwrap();

    store.set(F::A, 5).unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["A start", "B depth 2", "C depth 3", "A end"]
    );
    assert_eq!(store.get(F::B), 10);
    assert_eq!(store.get(F::C), 11);
    assert_eq!(store.get(F::Sum), 26);
    assert_eq!(store.depth(), 0);
}

#[test]
fn identical_writes_fire_effects_every_time() {
    let runs = Rc::new(RefCell::new(0));
    let counter = runs.clone();
    let mut store = base()
        .effect(F::A, move |_, _| {
            *counter.borrow_mut() += 1;
            Ok(())
        })
        .build()
        .unwrap();

    store.set(F::A, 3).unwrap();
    store.set(F::A, 3).unwrap();
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn a_write_may_be_overwritten_by_its_own_cascade() {
    let mut store = base()
        .effect(F::A, |s, v| if *v > 10 { s.set(F::A, 10) } else { Ok(()) })
        .build()
        .unwrap();

    store.set(F::A, 50).unwrap();
    assert_eq!(store.get(F::A), 10);
}

#[test]
fn runaway_cascades_are_stopped() {
    let mut store = base()
        .effect(F::A, |s, v| s.set(F::B, v + 1))
        .effect(F::B, |s, v| s.set(F::A, v + 1))
        .build()
        .unwrap();

    let err = store.set(F::A, 0).unwrap_err();
    assert!(matches!(err, StoreError::CascadeTooDeep(n) if n == MAX_CASCADE_DEPTH));
    // the store is usable again afterwards
    assert_eq!(store.depth(), 0);
    assert_eq!(store.get(F::A) + 1, store.get(F::B));
}

#[test]
fn failing_effect_stops_later_effects_but_keeps_the_value() {
    let ran = Rc::new(RefCell::new(false));
    let flag = ran.clone();
    let mut store = base()
        .effect(F::A, |_, _| Err(StoreError::Effect("boom".to_string())))
        .effect(F::A, move |_, _| {
            *flag.borrow_mut() = true;
            Ok(())
        })
        .build()
        .unwrap();

    let err = store.set(F::A, 9).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert!(!*ran.borrow());
    assert_eq!(store.get(F::A), 9);
}
