use serde::Serialize;

use crate::{
    analisis::{
        dosn::{
            self,
            EstadisticasDosn,
        },
        germinacion::{
            self,
            EstadisticasGerminacion,
        },
        pms::{
            self,
            EstadisticasPms,
        },
        pureza::{
            self,
            EstadisticasPureza,
        },
        tetrazolio::{
            self,
            EstadisticasTetrazolio,
        },
        validacion::MotivoValidacion,
        Repeticion,
    },
    core::models::TipoAnalisis,
};

pub fn media(valores: &[f64]) -> f64 {
    if valores.is_empty() {
        return 0.0;
    }
    valores.iter().sum::<f64>() / valores.len() as f64
}

/// Desvío estándar muestral (divisor n - 1). Con menos de dos valores no
/// hay dispersión que estimar y devuelve 0.
pub fn desvio_estandar_muestral(valores: &[f64]) -> f64 {
    if valores.len() < 2 {
        return 0.0;
    }
    let m = media(valores);
    let suma_cuadrados: f64 = valores.iter().map(|v| (v - m).powi(2)).sum();
    (suma_cuadrados / (valores.len() - 1) as f64).sqrt()
}

/// Coeficiente de variación en porcentaje. Media cero devuelve 0 para no
/// dividir por cero; ese caso ya viene bloqueado por la validación de pesos.
pub fn coeficiente_variacion(media: f64, desvio: f64) -> f64 {
    if media == 0.0 {
        return 0.0;
    }
    desvio / media * 100.0
}

/// Estadísticos agregados de un análisis, según su tipo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tipo", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Estadisticas {
    Germinacion(EstadisticasGerminacion),
    Pms(EstadisticasPms),
    Tetrazolio(EstadisticasTetrazolio),
    Pureza(EstadisticasPureza),
    Dosn(EstadisticasDosn),
}

/// Agrega las repeticiones guardadas de un análisis. Las repeticiones
/// tienen que ser todas del tipo pedido; una mezcla indica datos corruptos
/// y corta con `TipoIncompatible`.
pub fn agregar(tipo: TipoAnalisis, reps: &[Repeticion]) -> Result<Estadisticas, MotivoValidacion> {
    match tipo {
        TipoAnalisis::Germinacion => {
            let reps = payloads(reps, tipo, |r| match r {
                Repeticion::Germinacion(p) => Some(p),
                _ => None,
            })?;
            Ok(Estadisticas::Germinacion(germinacion::agregar(reps)))
        }
        TipoAnalisis::Pms => {
            let reps = payloads(reps, tipo, |r| match r {
                Repeticion::Pms(p) => Some(p),
                _ => None,
            })?;
            Ok(Estadisticas::Pms(pms::agregar(reps)))
        }
        TipoAnalisis::Tetrazolio => {
            let reps = payloads(reps, tipo, |r| match r {
                Repeticion::Tetrazolio(p) => Some(p),
                _ => None,
            })?;
            Ok(Estadisticas::Tetrazolio(tetrazolio::agregar(reps)))
        }
        TipoAnalisis::Pureza => {
            let reps = payloads(reps, tipo, |r| match r {
                Repeticion::Pureza(p) => Some(p),
                _ => None,
            })?;
            Ok(Estadisticas::Pureza(pureza::agregar(reps)))
        }
        TipoAnalisis::Dosn => {
            let reps = payloads(reps, tipo, |r| match r {
                Repeticion::Dosn(p) => Some(p),
                _ => None,
            })?;
            Ok(Estadisticas::Dosn(dosn::agregar(reps)))
        }
    }
}

fn payloads<'a, T>(
    reps: &'a [Repeticion],
    esperado: TipoAnalisis,
    extraer: impl Fn(&'a Repeticion) -> Option<&'a T>,
) -> Result<Vec<&'a T>, MotivoValidacion> {
    reps.iter()
        .map(|rep| {
            extraer(rep)
                .ok_or(MotivoValidacion::TipoIncompatible { esperado, recibido: rep.tipo() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aprox(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn media_de_vacio_es_cero() {
        assert_eq!(media(&[]), 0.0);
    }

    #[test]
    fn desvio_muestral_divide_por_n_menos_uno() {
        let pesos = [42.0, 43.0, 41.5, 42.5];
        assert!(aprox(media(&pesos), 42.25));
        // suma de cuadrados 1.25, muestral: sqrt(1.25 / 3)
        assert!(aprox(desvio_estandar_muestral(&pesos), (1.25f64 / 3.0).sqrt()));
    }

    #[test]
    fn desvio_con_un_solo_valor_es_cero() {
        assert_eq!(desvio_estandar_muestral(&[42.0]), 0.0);
        assert_eq!(desvio_estandar_muestral(&[]), 0.0);
    }

    #[test]
    fn cv_en_porcentaje() {
        let pesos = [42.0, 43.0, 41.5, 42.5];
        let cv = coeficiente_variacion(media(&pesos), desvio_estandar_muestral(&pesos));
        assert!(aprox(cv, (1.25f64 / 3.0).sqrt() / 42.25 * 100.0));
        assert!(cv < 4.0);
    }

    #[test]
    fn cv_con_media_cero_no_divide() {
        assert_eq!(coeficiente_variacion(0.0, 1.0), 0.0);
    }

    #[test]
    fn mezcla_de_tipos_corta_la_agregacion() {
        use crate::analisis::{pms::RepPms, tetrazolio::RepTetrazolio};

        let reps = vec![
            Repeticion::Pms(RepPms { peso: 42.0, tanda: 1, valida: true }),
            Repeticion::Tetrazolio(RepTetrazolio {
                viables: 40,
                no_viables: 8,
                duras: 2,
                fecha: None,
            }),
        ];
        let resultado = agregar(TipoAnalisis::Pms, &reps);
        assert_eq!(
            resultado.unwrap_err(),
            MotivoValidacion::TipoIncompatible {
                esperado: TipoAnalisis::Pms,
                recibido: TipoAnalisis::Tetrazolio,
            }
        );
    }
}
