pub mod analisis;
pub mod api;
pub mod core;
pub mod persistence;
pub mod workflow;

pub use crate::{
    analisis::{Estadisticas, Repeticion, RepeticionGuardada},
    api::{AnalisisApi, HttpApi},
    core::{ApiConfig, SemlabError},
    workflow::{Desenlace, Orquestador},
};
