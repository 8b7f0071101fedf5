use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::analisis::validacion::{
    Clasificacion,
    MotivoValidacion,
    Validacion,
};

/// Semillas de una especie ajena encontradas en la muestra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtraEspecie {
    pub especie: String,
    pub cantidad: u32,
}

/// Una repetición de DOSN: cuánto material se revisó y qué especies ajenas
/// aparecieron. Una lista vacía es un resultado válido, significa muestra
/// limpia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepDosn {
    pub peso_analizado: f64,
    #[serde(default)]
    pub otras_especies: Vec<OtraEspecie>,
}

impl RepDosn {
    pub fn total_semillas(&self) -> u32 {
        self.otras_especies.iter().map(|otra| otra.cantidad).sum()
    }
}

pub fn validar_dosn(rep: &RepDosn) -> Result<Validacion<u32>, MotivoValidacion> {
    if !(rep.peso_analizado > 0.0) {
        return Err(MotivoValidacion::PesoNoPositivo { peso: rep.peso_analizado });
    }
    if rep.otras_especies.iter().any(|otra| otra.especie.trim().is_empty()) {
        return Err(MotivoValidacion::EspecieVacia);
    }
    Ok(Validacion { total: rep.total_semillas(), clasificacion: Clasificacion::EnRango })
}

/// Totales por especie sobre todas las repeticiones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasDosn {
    pub repeticiones: u32,
    pub peso_analizado: f64,
    pub total_semillas: u32,
    pub por_especie: BTreeMap<String, u32>,
}

pub fn agregar<'a>(reps: impl IntoIterator<Item = &'a RepDosn>) -> EstadisticasDosn {
    let mut stats = EstadisticasDosn {
        repeticiones: 0,
        peso_analizado: 0.0,
        total_semillas: 0,
        por_especie: BTreeMap::new(),
    };
    for rep in reps {
        stats.repeticiones += 1;
        stats.peso_analizado += rep.peso_analizado;
        for otra in &rep.otras_especies {
            stats.total_semillas += otra.cantidad;
            *stats.por_especie.entry(otra.especie.clone()).or_insert(0) += otra.cantidad;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn otra(especie: &str, cantidad: u32) -> OtraEspecie {
        OtraEspecie { especie: especie.to_string(), cantidad }
    }

    #[test]
    fn muestra_limpia_es_valida() {
        let rep = RepDosn { peso_analizado: 120.0, otras_especies: vec![] };
        let v = validar_dosn(&rep).unwrap();
        assert_eq!(v.total, 0);
        assert_eq!(v.clasificacion, Clasificacion::EnRango);
    }

    #[test]
    fn peso_no_positivo_se_rechaza() {
        let rep = RepDosn { peso_analizado: 0.0, otras_especies: vec![] };
        assert!(matches!(validar_dosn(&rep), Err(MotivoValidacion::PesoNoPositivo { .. })));
    }

    #[test]
    fn especie_sin_nombre_se_rechaza() {
        let rep = RepDosn { peso_analizado: 120.0, otras_especies: vec![otra("  ", 2)] };
        assert_eq!(validar_dosn(&rep), Err(MotivoValidacion::EspecieVacia));
    }

    #[test]
    fn acumula_por_especie() {
        let reps = [
            RepDosn {
                peso_analizado: 120.0,
                otras_especies: vec![otra("Lolium multiflorum", 3), otra("Avena fatua", 1)],
            },
            RepDosn { peso_analizado: 118.5, otras_especies: vec![otra("Lolium multiflorum", 2)] },
        ];
        let stats = agregar(&reps);

        assert_eq!(stats.repeticiones, 2);
        assert_eq!(stats.total_semillas, 6);
        assert_eq!(stats.por_especie["Lolium multiflorum"], 5);
        assert_eq!(stats.por_especie["Avena fatua"], 1);
        assert!((stats.peso_analizado - 238.5).abs() < 1e-9);
    }
}
