use serde::Serialize;
use thiserror::Error;

use crate::{
    analisis::{
        dosn,
        pms,
        pureza,
        tetrazolio,
        Repeticion,
    },
    core::models::{
        ConfigAnalisis,
        TipoAnalisis,
    },
};

/// Banda de trabajo alrededor del valor esperado: ±5%, según el manual
/// de procedimientos del laboratorio.
pub const TOLERANCIA_BANDA: f64 = 0.05;

/// Dónde cayó el total de una repetición respecto de la banda de trabajo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Clasificacion {
    DebajoDelMinimo,
    EnRango,
    ExcedeMaximo,
}

impl Clasificacion {
    /// Solo el exceso bloquea el guardado. Quedarse corto se guarda igual,
    /// con una advertencia para el analista.
    pub fn bloquea_guardado(&self) -> bool {
        matches!(self, Clasificacion::ExcedeMaximo)
    }
}

/// Resultado de clasificar una repetición: el total calculado y dónde cayó.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validacion<T> {
    pub total: T,
    pub clasificacion: Clasificacion,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotivoValidacion {
    #[error("una repetición no puede guardarse con total cero")]
    TotalCero,

    #[error("el total {total} excede el máximo tolerado de {maximo} semillas")]
    TotalExcedeMaximo { total: u32, maximo: u32 },

    #[error("las categorías suman {total} semillas y deben sumar exactamente {esperado}")]
    SumaIncorrecta { total: u32, esperado: u32 },

    #[error("el peso debe ser positivo, se recibió {peso}")]
    PesoNoPositivo { peso: f64 },

    #[error("la suma de pesos {suma:.2} g cae fuera de la banda [{minimo:.2}, {maximo:.2}]")]
    PesoFueraDeBanda { suma: f64, minimo: f64, maximo: f64 },

    #[error("la tanda {tanda} no existe, el análisis define {num_tandas}")]
    TandaFueraDeRango { tanda: u32, num_tandas: u32 },

    #[error("se esperaban {esperados} conteos de normales y llegaron {recibidos}")]
    ConteosInesperados { esperados: usize, recibidos: usize },

    #[error("los porcentajes suman {suma} y deben sumar exactamente 100")]
    PorcentajesNoSuman100 { suma: u32 },

    #[error("la tabla {numero} todavía no está finalizada")]
    TablaNoFinalizada { numero: u32 },

    #[error("la tabla {numero} ya está finalizada y no admite más conteos")]
    TablaFinalizada { numero: u32 },

    #[error("hay una especie sin nombre en el listado de otras semillas")]
    EspecieVacia,

    #[error("las repeticiones de germinación se validan contra su tabla")]
    GerminacionRequiereTabla,

    #[error("se esperaba una repetición de {esperado} y llegó una de {recibido}")]
    TipoIncompatible { esperado: TipoAnalisis, recibido: TipoAnalisis },
}

/// Banda inclusiva `[min, max]` para un total esperado de semillas.
/// Los extremos se redondean al entero más cercano.
pub fn banda_tolerancia(esperado: u32) -> (u32, u32) {
    let esperado = esperado as f64;
    let minimo = (esperado * (1.0 - TOLERANCIA_BANDA)).round() as u32;
    let maximo = (esperado * (1.0 + TOLERANCIA_BANDA)).round() as u32;
    (minimo, maximo)
}

/// Clasifica un total de semillas contra la banda de trabajo.
/// Total cero es siempre un error: cuenta como repetición vacía.
pub fn clasificar_total(total: u32, esperado: u32) -> Result<Validacion<u32>, MotivoValidacion> {
    if total == 0 {
        return Err(MotivoValidacion::TotalCero);
    }
    let (minimo, maximo) = banda_tolerancia(esperado);
    let clasificacion = if total < minimo {
        Clasificacion::DebajoDelMinimo
    } else if total > maximo {
        Clasificacion::ExcedeMaximo
    } else {
        Clasificacion::EnRango
    };
    Ok(Validacion { total, clasificacion })
}

/// Igual que [`clasificar_total`] pero para pesos en gramos, sin redondeo.
pub fn clasificar_peso(suma: f64, esperado: f64) -> Result<Validacion<f64>, MotivoValidacion> {
    if !(suma > 0.0) {
        return Err(MotivoValidacion::PesoNoPositivo { peso: suma });
    }
    let minimo = esperado * (1.0 - TOLERANCIA_BANDA);
    let maximo = esperado * (1.0 + TOLERANCIA_BANDA);
    let clasificacion = if suma < minimo {
        Clasificacion::DebajoDelMinimo
    } else if suma > maximo {
        Clasificacion::ExcedeMaximo
    } else {
        Clasificacion::EnRango
    };
    Ok(Validacion { total: suma, clasificacion })
}

/// Valida una repetición suelta contra la configuración de su análisis.
///
/// Devuelve la clasificación con la que conviene notificar al usuario;
/// un exceso sobre la banda ya sale como error, nunca como clasificación.
/// Las repeticiones de germinación no pasan por acá: se validan contra su
/// tabla, ver [`germinacion::validar_para_guardar`](super::germinacion::validar_para_guardar).
pub fn validar_repeticion(
    rep: &Repeticion,
    config: &ConfigAnalisis,
) -> Result<Clasificacion, MotivoValidacion> {
    match (rep, config) {
        (Repeticion::Pms(r), ConfigAnalisis::Pms { num_tandas }) => {
            pms::validar_pms(r, *num_tandas).map(|v| v.clasificacion)
        }
        (Repeticion::Tetrazolio(r), ConfigAnalisis::Tetrazolio { semillas_por_rep, .. }) => {
            tetrazolio::validar_tetrazolio(r, *semillas_por_rep).map(|v| v.clasificacion)
        }
        (Repeticion::Pureza(r), ConfigAnalisis::Pureza { .. }) => pureza::validar_para_guardar(r),
        (Repeticion::Dosn(r), ConfigAnalisis::Dosn { .. }) => {
            dosn::validar_dosn(r).map(|v| v.clasificacion)
        }
        (Repeticion::Germinacion(_), ConfigAnalisis::Germinacion { .. }) => {
            Err(MotivoValidacion::GerminacionRequiereTabla)
        }
        (rep, config) => Err(MotivoValidacion::TipoIncompatible {
            esperado: config.tipo(),
            recibido: rep.tipo(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banda_redondea_al_entero_mas_cercano() {
        assert_eq!(banda_tolerancia(100), (95, 105));
        assert_eq!(banda_tolerancia(50), (48, 53)); // 47.5 y 52.5 redondean hacia arriba
        assert_eq!(banda_tolerancia(25), (24, 26));
    }

    #[test]
    fn total_cero_siempre_es_error() {
        assert_eq!(clasificar_total(0, 100), Err(MotivoValidacion::TotalCero));
    }

    #[test]
    fn clasificacion_sobre_banda_de_100() {
        assert_eq!(clasificar_total(95, 100).unwrap().clasificacion, Clasificacion::EnRango);
        assert_eq!(clasificar_total(105, 100).unwrap().clasificacion, Clasificacion::EnRango);
        assert_eq!(
            clasificar_total(94, 100).unwrap().clasificacion,
            Clasificacion::DebajoDelMinimo
        );
        assert_eq!(clasificar_total(106, 100).unwrap().clasificacion, Clasificacion::ExcedeMaximo);
    }

    #[test]
    fn solo_el_exceso_bloquea() {
        assert!(Clasificacion::ExcedeMaximo.bloquea_guardado());
        assert!(!Clasificacion::DebajoDelMinimo.bloquea_guardado());
        assert!(!Clasificacion::EnRango.bloquea_guardado());
    }

    #[test]
    fn peso_no_positivo_es_error() {
        assert!(matches!(
            clasificar_peso(0.0, 10.0),
            Err(MotivoValidacion::PesoNoPositivo { .. })
        ));
        assert!(matches!(
            clasificar_peso(-1.5, 10.0),
            Err(MotivoValidacion::PesoNoPositivo { .. })
        ));
        assert!(matches!(
            clasificar_peso(f64::NAN, 10.0),
            Err(MotivoValidacion::PesoNoPositivo { .. })
        ));
    }

    #[test]
    fn peso_se_clasifica_sin_redondeo() {
        assert_eq!(clasificar_peso(9.5, 10.0).unwrap().clasificacion, Clasificacion::EnRango);
        assert_eq!(
            clasificar_peso(9.49, 10.0).unwrap().clasificacion,
            Clasificacion::DebajoDelMinimo
        );
        assert_eq!(clasificar_peso(10.51, 10.0).unwrap().clasificacion, Clasificacion::ExcedeMaximo);
    }
}
