//! Domain and wire types shared by the server and the client library

pub mod boletin;
pub mod envelope;
pub mod news;

pub use boletin::{Boletin, BoletinChanges, BoletinEstadoRow, BoletinResumen, NewBoletin, Plazo};
pub use envelope::{ApiResponse, ResponseStatus};
pub use news::{Article, NewsSearchResponse, SourcesResponse};
