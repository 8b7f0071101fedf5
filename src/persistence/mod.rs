use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::errors::SemlabError;

const APP_NAME: &str = "semlab";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn save_json_in<T: Serialize>(dir: &Path, data: &T, filename: &str) -> Result<(), SemlabError> {
    let file_path = dir.join(filename);
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&file_path, json)?;
    log::debug!("Datos guardados en {}", file_path.display());
    Ok(())
}

pub fn load_json_in<T: for<'de> Deserialize<'de> + Default>(
    dir: &Path,
    filename: &str,
) -> Result<T, SemlabError> {
    let file_path = dir.join(filename);

    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(&file_path)?;
    let data: T = serde_json::from_str(&json)?;
    log::debug!("Datos leídos de {}", file_path.display());
    Ok(data)
}

pub fn save_json<T: Serialize>(data: &T, filename: &str) -> Result<(), SemlabError> {
    save_json_in(&get_app_data_dir(), data, filename)
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(filename: &str) -> Result<T, SemlabError> {
    load_json_in(&get_app_data_dir(), filename)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(filename: &str) -> T {
    match load_json::<T>(filename) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("No se pudo leer {}: {}. Se usan los valores por defecto.", filename, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Registro {
        nombre: String,
        intentos: u32,
    }

    #[test]
    fn round_trip_en_directorio() {
        let dir = tempdir().unwrap();
        let original = Registro { nombre: "lote".into(), intentos: 3 };

        save_json_in(dir.path(), &original, "registro.json").unwrap();
        let leido: Registro = load_json_in(dir.path(), "registro.json").unwrap();

        assert_eq!(leido, original);
    }

    #[test]
    fn archivo_ausente_devuelve_default() {
        let dir = tempdir().unwrap();
        let leido: Registro = load_json_in(dir.path(), "no-existe.json").unwrap();
        assert_eq!(leido, Registro::default());
    }

    #[test]
    fn archivo_corrupto_es_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("roto.json"), "{esto no es json").unwrap();
        let resultado: Result<Registro, _> = load_json_in(dir.path(), "roto.json");
        assert!(resultado.is_err());
    }
}
