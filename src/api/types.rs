use serde::{
    Deserialize,
    Serialize,
};

use crate::core::models::{
    AccionRemota,
    Actor,
    Rol,
};

/// Cuerpo del POST de transición de workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransicionPeticion {
    pub accion: AccionRemota,
    pub actor: String,
    pub rol: Rol,
}

impl TransicionPeticion {
    pub fn nueva(accion: AccionRemota, actor: &Actor) -> Self {
        TransicionPeticion { accion, actor: actor.nombre.clone(), rol: actor.rol }
    }
}

/// Forma del cuerpo de error que devuelve el servicio. Todos los campos son
/// opcionales porque las versiones viejas devuelven solo texto.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorServicio {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peticion_de_transicion_en_camel_case() {
        let actor = Actor::new("jlopez", Rol::Supervisor);
        let peticion = TransicionPeticion::nueva(AccionRemota::MarcarParaRepetir, &actor);
        let json = serde_json::to_value(&peticion).unwrap();

        assert_eq!(json["accion"], "marcarParaRepetir");
        assert_eq!(json["actor"], "jlopez");
        assert_eq!(json["rol"], "SUPERVISOR");
    }

    #[test]
    fn error_de_servicio_tolera_campos_ausentes() {
        let vacio: ErrorServicio = serde_json::from_str("{}").unwrap();
        assert!(vacio.message.is_none());

        let tipico: ErrorServicio =
            serde_json::from_str(r#"{"status": 409, "message": "estado inválido"}"#).unwrap();
        assert_eq!(tipico.status, Some(409));
        assert_eq!(tipico.message.as_deref(), Some("estado inválido"));
    }
}
