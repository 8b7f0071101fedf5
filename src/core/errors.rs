use thiserror::Error;

use crate::{
    analisis::validacion::MotivoValidacion,
    workflow::estados::MotivoGuarda,
};

#[derive(Error, Debug)]
pub enum SemlabError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error de red: {0}")]
    Red(Box<reqwest::Error>),

    #[error("Validación rechazada: {0}")]
    Validacion(#[from] MotivoValidacion),

    #[error("Operación rechazada: {0}")]
    Guarda(#[from] MotivoGuarda),

    #[error("El servicio rechazó la operación ({status}): {mensaje}")]
    Rechazo { status: u16, mensaje: String },

    #[error("Análisis {0} no encontrado")]
    NoEncontrado(u64),

    #[error("La tabla {numero} del análisis {analisis} no existe")]
    TablaNoEncontrada { analisis: u64, numero: u32 },

    #[error("SemlabError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for SemlabError {
    fn from(error: std::io::Error) -> Self {
        SemlabError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for SemlabError {
    fn from(error: reqwest::Error) -> Self {
        SemlabError::Red(Box::new(error))
    }
}
