pub mod estados;
pub mod orquestador;

pub use estados::{verificar_completitud, verificar_transicion, DatosAnalisis, MotivoGuarda};
pub use orquestador::{
    Confirmacion, Confirmador, Desenlace, Notificador, Orquestador, VarianteConfirmacion,
};
