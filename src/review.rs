//! Star rating and comment form under a product.

use crate::api::{Client, Transport};
use crate::models::ReviewDraft;
use crate::store::{FieldId, Store, StoreBuilder, StoreError};
use log::{info, warn};
use std::rc::Rc;

pub const MAX_RATING: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReviewField {
    Rating,
    Comment,
    Submitting,
    Submitted,
    CanSubmit,
}

impl FieldId for ReviewField {
    const ALL: &'static [Self] = &[
        ReviewField::Rating,
        ReviewField::Comment,
        ReviewField::Submitting,
        ReviewField::Submitted,
        ReviewField::CanSubmit,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewValue {
    /// 0 means no star selected yet.
    Rating(u8),
    Text(String),
    Flag(bool),
}

pub trait ReviewView {
    /// Fills the first `rating` of [`MAX_RATING`] stars.
    fn render_stars(&self, rating: u8);
    fn set_submitting(&self, submitting: bool);
    fn show_thanks(&self);
    fn show_error(&self, message: &str);
}

fn flag(value: Option<&ReviewValue>) -> bool {
    matches!(value, Some(ReviewValue::Flag(true)))
}

fn rating_of(store: &Store<ReviewField, ReviewValue>) -> u8 {
    match store.peek(ReviewField::Rating) {
        Some(ReviewValue::Rating(n)) => *n,
        _ => 0,
    }
}

pub struct ReviewWidget {
    store: Store<ReviewField, ReviewValue>,
    view: Rc<dyn ReviewView>,
}

impl ReviewWidget {
    pub fn new(view: Rc<dyn ReviewView>) -> Result<Self, StoreError> {
        let stars_view = view.clone();
        let button_view = view.clone();
        let thanks_view = view.clone();

        let store = StoreBuilder::new()
            .stored(ReviewField::Rating, ReviewValue::Rating(0))
            .stored(ReviewField::Comment, ReviewValue::Text(String::new()))
            .stored(ReviewField::Submitting, ReviewValue::Flag(false))
            .stored(ReviewField::Submitted, ReviewValue::Flag(false))
            .derived(ReviewField::CanSubmit, |s| {
                let rated = (1..=MAX_RATING).contains(&rating_of(s));
                ReviewValue::Flag(
                    rated
                        && !flag(s.peek(ReviewField::Submitting))
                        && !flag(s.peek(ReviewField::Submitted)),
                )
            })
            .effect(ReviewField::Rating, move |_, value| {
                if let ReviewValue::Rating(n) = value {
                    stars_view.render_stars(*n);
                }
                Ok(())
            })
            .effect(ReviewField::Submitting, move |_, value| {
                button_view.set_submitting(flag(Some(value)));
                Ok(())
            })
            .effect(ReviewField::Submitted, move |_, value| {
                if flag(Some(value)) {
                    thanks_view.show_thanks();
                }
                Ok(())
            })
            .build()?;

        Ok(ReviewWidget { store, view })
    }

    pub fn store(&self) -> &Store<ReviewField, ReviewValue> {
        &self.store
    }

    pub fn rating(&self) -> u8 {
        rating_of(&self.store)
    }

    pub fn comment(&self) -> String {
        match self.store.peek(ReviewField::Comment) {
            Some(ReviewValue::Text(text)) => text.clone(),
            _ => String::new(),
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.store.get(ReviewField::CanSubmit), ReviewValue::Flag(true))
    }

    pub fn is_submitted(&self) -> bool {
        flag(self.store.peek(ReviewField::Submitted))
    }

    /// Selects a star count, capped at [`MAX_RATING`].
    pub fn rate(&mut self, stars: u8) -> Result<u8, StoreError> {
        let stars = stars.min(MAX_RATING);
        self.store
            .set(ReviewField::Rating, ReviewValue::Rating(stars))?;
        Ok(stars)
    }

    pub fn write_comment(&mut self, comment: &str) -> Result<(), StoreError> {
        self.store
            .set(ReviewField::Comment, ReviewValue::Text(comment.to_string()))
    }

    /// Sends the review. Returns whether it was accepted; without a rating
    /// nothing is sent.
    pub async fn submit<T: Transport>(
        &mut self,
        client: &Client<T>,
        product_id: i64,
    ) -> Result<bool, StoreError> {
        if self.is_submitted() || flag(self.store.peek(ReviewField::Submitting)) {
            return Ok(false);
        }
        if !self.can_submit() {
            self.view.show_error("Selecione uma nota de 1 a 5 estrelas.");
            return Ok(false);
        }

        let draft = ReviewDraft {
            product_id,
            rating: self.rating(),
            comment: self.comment().trim().to_string(),
        };

        self.store
            .set(ReviewField::Submitting, ReviewValue::Flag(true))?;
        let result = client.submit_review(&draft).await;
        self.store
            .set(ReviewField::Submitting, ReviewValue::Flag(false))?;

        match result {
            Ok(()) => {
                info!("review submitted for product {}", product_id);
                self.store
                    .set(ReviewField::Submitted, ReviewValue::Flag(true))?;
                Ok(true)
            }
            Err(e) => {
                warn!("review submission failed: {}", e);
                self.view.show_error(&e.to_string());
                Ok(false)
            }
        }
    }
}
