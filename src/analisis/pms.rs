use std::{
    collections::BTreeSet,
    fmt,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::analisis::{
    estadisticas::{
        coeficiente_variacion,
        desvio_estandar_muestral,
        media,
    },
    validacion::{
        Clasificacion,
        MotivoValidacion,
        Validacion,
    },
};

/// Umbral de uniformidad entre pesadas: el coeficiente de variación tiene
/// que quedar en o por debajo de este porcentaje.
pub const UMBRAL_CV: f64 = 4.0;

/// Una pesada de PMS: el peso en gramos de una tanda de semillas contadas.
/// `valida` en falso excluye la pesada de los estadísticos sin borrarla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPms {
    pub peso: f64,
    pub tanda: u32,
    pub valida: bool,
}

/// El peso tiene que ser positivo y la tanda existir en la configuración.
/// Las tandas se numeran desde 1.
pub fn validar_pms(rep: &RepPms, num_tandas: u32) -> Result<Validacion<f64>, MotivoValidacion> {
    if !(rep.peso > 0.0) {
        return Err(MotivoValidacion::PesoNoPositivo { peso: rep.peso });
    }
    if rep.tanda == 0 || rep.tanda > num_tandas {
        return Err(MotivoValidacion::TandaFueraDeRango { tanda: rep.tanda, num_tandas });
    }
    Ok(Validacion { total: rep.peso, clasificacion: Clasificacion::EnRango })
}

/// Tandas con al menos una pesada válida.
pub fn tandas_presentes<'a>(reps: impl IntoIterator<Item = &'a RepPms>) -> BTreeSet<u32> {
    reps.into_iter().filter(|rep| rep.valida).map(|rep| rep.tanda).collect()
}

/// Si las pesadas fueron lo bastante parejas como para informar el PMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Criterio {
    Cumplido,
    NoCumplido,
}

impl fmt::Display for Criterio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterio::Cumplido => f.write_str("criterio cumplido"),
            Criterio::NoCumplido => f.write_str("criterio no cumplido"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasPms {
    pub pesadas_validas: u32,
    pub media: f64,
    pub desvio_estandar: f64,
    pub coeficiente_variacion: f64,
}

impl EstadisticasPms {
    pub fn criterio(&self) -> Criterio {
        if self.coeficiente_variacion <= UMBRAL_CV {
            Criterio::Cumplido
        } else {
            Criterio::NoCumplido
        }
    }
}

/// Media, desvío muestral y CV sobre las pesadas marcadas como válidas.
pub fn agregar<'a>(reps: impl IntoIterator<Item = &'a RepPms>) -> EstadisticasPms {
    let pesos: Vec<f64> = reps.into_iter().filter(|rep| rep.valida).map(|rep| rep.peso).collect();
    let media = media(&pesos);
    let desvio = desvio_estandar_muestral(&pesos);
    EstadisticasPms {
        pesadas_validas: pesos.len() as u32,
        media,
        desvio_estandar: desvio,
        coeficiente_variacion: coeficiente_variacion(media, desvio),
    }
}
