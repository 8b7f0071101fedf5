use chrono::NaiveDate;
use serde::{
    Deserialize,
    Serialize,
};

use crate::analisis::validacion::{
    Clasificacion,
    MotivoValidacion,
    Validacion,
};

/// Una repetición de tetrazolio: semillas teñidas clasificadas en una
/// lectura. Acá no hay banda de tolerancia, las categorías tienen que
/// sumar exactamente las semillas de la repetición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepTetrazolio {
    pub viables: u32,
    pub no_viables: u32,
    pub duras: u32,
    #[serde(default)]
    pub fecha: Option<NaiveDate>,
}

impl RepTetrazolio {
    pub fn total(&self) -> u32 {
        self.viables + self.no_viables + self.duras
    }
}

pub fn validar_tetrazolio(
    rep: &RepTetrazolio,
    semillas_por_rep: u32,
) -> Result<Validacion<u32>, MotivoValidacion> {
    let total = rep.total();
    if total != semillas_por_rep {
        return Err(MotivoValidacion::SumaIncorrecta { total, esperado: semillas_por_rep });
    }
    Ok(Validacion { total, clasificacion: Clasificacion::EnRango })
}

/// Totales acumulados sobre todas las repeticiones, más la viabilidad
/// resultante en porcentaje.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasTetrazolio {
    pub repeticiones: u32,
    pub viables: u32,
    pub no_viables: u32,
    pub duras: u32,
    pub viabilidad_pct: f64,
}

pub fn agregar<'a>(reps: impl IntoIterator<Item = &'a RepTetrazolio>) -> EstadisticasTetrazolio {
    let mut stats = EstadisticasTetrazolio {
        repeticiones: 0,
        viables: 0,
        no_viables: 0,
        duras: 0,
        viabilidad_pct: 0.0,
    };
    for rep in reps {
        stats.repeticiones += 1;
        stats.viables += rep.viables;
        stats.no_viables += rep.no_viables;
        stats.duras += rep.duras;
    }
    let total = stats.viables + stats.no_viables + stats.duras;
    if total > 0 {
        stats.viabilidad_pct = stats.viables as f64 / total as f64 * 100.0;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suma_exacta_se_acepta() {
        let rep = RepTetrazolio { viables: 45, no_viables: 3, duras: 2, fecha: None };
        let v = validar_tetrazolio(&rep, 50).unwrap();
        assert_eq!(v.total, 50);
        assert_eq!(v.clasificacion, Clasificacion::EnRango);
    }

    #[test]
    fn suma_distinta_se_rechaza() {
        let corta = RepTetrazolio { viables: 45, no_viables: 3, duras: 1, fecha: None };
        assert_eq!(
            validar_tetrazolio(&corta, 50),
            Err(MotivoValidacion::SumaIncorrecta { total: 49, esperado: 50 })
        );

        let pasada = RepTetrazolio { viables: 47, no_viables: 3, duras: 2, fecha: None };
        assert_eq!(
            validar_tetrazolio(&pasada, 50),
            Err(MotivoValidacion::SumaIncorrecta { total: 52, esperado: 50 })
        );
    }

    #[test]
    fn vacia_se_rechaza_por_suma() {
        let vacia = RepTetrazolio { viables: 0, no_viables: 0, duras: 0, fecha: None };
        assert_eq!(
            validar_tetrazolio(&vacia, 50),
            Err(MotivoValidacion::SumaIncorrecta { total: 0, esperado: 50 })
        );
    }

    #[test]
    fn agrega_totales_y_viabilidad() {
        let reps = [
            RepTetrazolio { viables: 40, no_viables: 8, duras: 2, fecha: None },
            RepTetrazolio { viables: 44, no_viables: 4, duras: 2, fecha: None },
        ];
        let stats = agregar(&reps);

        assert_eq!(stats.repeticiones, 2);
        assert_eq!(stats.viables, 84);
        assert_eq!(stats.no_viables, 12);
        assert_eq!(stats.duras, 4);
        assert!((stats.viabilidad_pct - 84.0).abs() < 1e-9);
    }
}
