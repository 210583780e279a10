//! Server state shared across handlers

use std::sync::Arc;

use crate::store::BoletinStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BoletinStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BoletinStore>) -> Self {
        Self { store }
    }
}
