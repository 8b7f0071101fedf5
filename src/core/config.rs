use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::errors::SemlabError,
    persistence,
};

pub const ARCHIVO_CONFIG: &str = "config.json";

const ENV_API_URL: &str = "SEMLAB_API_URL";
const ENV_TIMEOUT: &str = "SEMLAB_TIMEOUT_SECS";

/// Conexión al servicio de análisis. Se persiste en el directorio de datos
/// de la aplicación y se puede pisar por variables de entorno.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig { base_url: "http://localhost:8080/api".to_string(), timeout_secs: 30 }
    }
}

impl ApiConfig {
    /// Archivo si existe, valores por defecto si no, y por encima de todo
    /// las variables de entorno `SEMLAB_API_URL` y `SEMLAB_TIMEOUT_SECS`.
    pub fn cargar() -> Self {
        let config = persistence::load_json_or_default::<ApiConfig>(ARCHIVO_CONFIG);
        config.con_entorno()
    }

    pub fn guardar(&self) -> Result<(), SemlabError> {
        persistence::save_json(self, ARCHIVO_CONFIG)
    }

    fn con_entorno(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(valor) = std::env::var(ENV_TIMEOUT) {
            match valor.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => log::warn!("{} inválido: {:?}, se ignora", ENV_TIMEOUT, valor),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::persistence::{load_json_in, save_json_in};

    #[test]
    fn defaults_apuntan_al_servicio_local() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn round_trip_por_archivo() {
        let dir = tempdir().unwrap();
        let original =
            ApiConfig { base_url: "https://lab.example.com/api".into(), timeout_secs: 5 };

        save_json_in(dir.path(), &original, ARCHIVO_CONFIG).unwrap();
        let leida: ApiConfig = load_json_in(dir.path(), ARCHIVO_CONFIG).unwrap();

        assert_eq!(leida, original);
    }

    #[test]
    fn archivo_parcial_completa_con_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(ARCHIVO_CONFIG),
            r#"{ "base_url": "https://lab.example.com/api" }"#,
        )
        .unwrap();

        let leida: ApiConfig = load_json_in(dir.path(), ARCHIVO_CONFIG).unwrap();
        assert_eq!(leida.base_url, "https://lab.example.com/api");
        assert_eq!(leida.timeout_secs, 30);
    }

    #[test]
    fn el_entorno_pisa_lo_cargado() {
        std::env::set_var(ENV_API_URL, "https://qa.example.com/api");
        std::env::set_var(ENV_TIMEOUT, "no numérico");

        let config = ApiConfig::default().con_entorno();
        assert_eq!(config.base_url, "https://qa.example.com/api");
        // El timeout ilegible se ignora y queda el valor previo.
        assert_eq!(config.timeout_secs, 30);

        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_TIMEOUT);
    }
}
