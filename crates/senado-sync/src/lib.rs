//! Remote access to the Senate open data service: the fetcher seam, the
//! reqwest-backed client, and the three bill queries.

pub mod fetch;
pub mod query;

#[cfg(feature = "http")]
pub mod http;

pub use fetch::{Fetcher, LogNotifier, Notifier};
pub use query::{
    SearchFilters, buscar_atualizadas, buscar_materias, materias_atualizadas, pesquisar_materias,
    refresh_watchlist, situacao_atual,
};

#[cfg(feature = "http")]
pub use http::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, FetchError, SenadoClient};
