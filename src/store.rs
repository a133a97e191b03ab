use crate::storage::StorageError;
use log::{trace, warn};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use thiserror::Error;

/// Deepest chain of nested writes a single `set` may trigger.
///
/// The widgets in this crate never go past three levels (product → stock →
/// quantity); anything deeper is almost certainly two effects feeding each
/// other.
pub const MAX_CASCADE_DEPTH: usize = 8;

/// Identifies the fields of one container.
///
/// Implemented by a plain fieldless enum. `ALL` lists every variant so the
/// builder can check that each field is either stored or derived.
pub trait FieldId: Copy + Eq + Hash + fmt::Debug + 'static {
    const ALL: &'static [Self];
}

/// Computes a derived field from the current state.
pub type Derive<F, V> = Rc<dyn Fn(&Store<F, V>) -> V>;

/// Side effect bound to a stored field, run after every write to it.
pub type Effect<F, V> = Rc<dyn Fn(&mut Store<F, V>, &V) -> Result<(), StoreError>>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("field {0} is derived and cannot be assigned")]
    DerivedField(String),

    #[error("field {0} is declared both stored and derived")]
    Ambiguous(String),

    #[error("field {0} has neither an initial value nor a derive function")]
    Missing(String),

    #[error("effect bound to derived field {0}")]
    EffectOnDerived(String),

    #[error("cascade exceeded {0} nested writes")]
    CascadeTooDeep(usize),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Effect(String),
}

/// Collects the initial snapshot, the derive table and the effect table
/// of a container.
pub struct StoreBuilder<F: FieldId, V> {
    values: HashMap<F, V>,
    derives: HashMap<F, Derive<F, V>>,
    effects: HashMap<F, Vec<Effect<F, V>>>,
    duplicates: Vec<F>,
}

impl<F: FieldId, V: Clone> StoreBuilder<F, V> {
    pub fn new() -> Self {
        StoreBuilder {
            values: HashMap::new(),
            derives: HashMap::new(),
            effects: HashMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Declares a stored field with its initial value.
    pub fn stored(mut self, field: F, initial: V) -> Self {
        if self.derives.contains_key(&field) {
            self.duplicates.push(field);
        }
        self.values.insert(field, initial);
        self
    }

    /// Declares a derived field. `derive` must not have side effects.
    pub fn derived(mut self, field: F, derive: impl Fn(&Store<F, V>) -> V + 'static) -> Self {
        if self.values.contains_key(&field) {
            self.duplicates.push(field);
        }
        self.derives.insert(field, Rc::new(derive));
        self
    }

    /// Appends an effect to the list bound to `field`.
    ///
    /// Effects of the same field run in the order they were added here.
    pub fn effect(
        mut self,
        field: F,
        effect: impl Fn(&mut Store<F, V>, &V) -> Result<(), StoreError> + 'static,
    ) -> Self {
        self.effects.entry(field).or_default().push(Rc::new(effect));
        self
    }

    pub fn build(self) -> Result<Store<F, V>, StoreError> {
        if let Some(field) = self.duplicates.first() {
            return Err(StoreError::Ambiguous(format!("{:?}", field)));
        }

        for field in F::ALL {
            if !self.values.contains_key(field) && !self.derives.contains_key(field) {
                return Err(StoreError::Missing(format!("{:?}", field)));
            }
        }

        if let Some(field) = self.effects.keys().find(|f| self.derives.contains_key(*f)) {
            return Err(StoreError::EffectOnDerived(format!("{:?}", field)));
        }

        Ok(Store {
            values: self.values,
            derives: self.derives,
            effects: self.effects,
            depth: 0,
        })
    }
}

impl<F: FieldId, V: Clone> Default for StoreBuilder<F, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single source of truth for one widget's view state.
///
/// Every write commits the value and then runs the effects bound to that
/// field synchronously, depth-first. Effects may write other fields; those
/// writes run their own effects before the outer `set` returns. Writes are
/// never short-circuited on equal values.
pub struct Store<F: FieldId, V> {
    values: HashMap<F, V>,
    derives: HashMap<F, Derive<F, V>>,
    effects: HashMap<F, Vec<Effect<F, V>>>,
    depth: usize,
}

impl<F: FieldId, V: Clone> Store<F, V> {
    /// Current value of a stored field, or the freshly computed value of a
    /// derived one.
    pub fn get(&self, field: F) -> V {
        if let Some(derive) = self.derives.get(&field) {
            return derive(self);
        }
        // `build` guarantees every non-derived field has a value
        self.values[&field].clone()
    }

    /// Borrowed access to a stored field. `None` for derived fields.
    pub fn peek(&self, field: F) -> Option<&V> {
        self.values.get(&field)
    }

    /// Overwrites a stored field and runs its effects.
    ///
    /// The first failing effect stops the remaining effects of this write and
    /// its error is returned. The committed value is kept.
    pub fn set(&mut self, field: F, value: V) -> Result<(), StoreError> {
        if self.derives.contains_key(&field) {
            return Err(StoreError::DerivedField(format!("{:?}", field)));
        }

        if self.depth >= MAX_CASCADE_DEPTH {
            warn!(
                "cascade into {:?} exceeds {} nested writes, aborting",
                field, MAX_CASCADE_DEPTH
            );
            return Err(StoreError::CascadeTooDeep(MAX_CASCADE_DEPTH));
        }

        trace!("set {:?} (depth {})", field, self.depth);
        let committed = value.clone();
        self.values.insert(field, value);

        let effects = match self.effects.get(&field) {
            Some(effects) => effects.clone(),
            None => return Ok(()),
        };

        self.depth += 1;
        let result = effects
            .iter()
            .try_for_each(|effect| effect(self, &committed));
        self.depth -= 1;

        result
    }

    pub fn is_derived(&self, field: F) -> bool {
        self.derives.contains_key(&field)
    }

    /// Number of effects bound to `field`.
    pub fn effects(&self, field: F) -> usize {
        self.effects.get(&field).map_or(0, Vec::len)
    }

    /// Nesting level of the write currently running effects, 0 when idle.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<F: FieldId, V: fmt::Debug> fmt::Debug for Store<F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("values", &self.values)
            .field("derived", &self.derives.keys().collect::<Vec<_>>())
            .field("depth", &self.depth)
            .finish()
    }
}
