pub mod config;
pub mod errors;
pub mod models;

pub use config::ApiConfig;
pub use errors::SemlabError;
pub use models::{
    Accion, AccionRemota, Actor, Analisis, ConfigAnalisis, EntradaHistorial, Estado, Lote, Rol,
    TipoAnalisis,
};
