use serde::{
    Deserialize,
    Serialize,
};

use crate::analisis::validacion::{
    clasificar_peso,
    Clasificacion,
    MotivoValidacion,
    Validacion,
    TOLERANCIA_BANDA,
};

/// Una repetición de pureza: el peso inicial de la muestra de trabajo y el
/// peso de cada componente separado, todo en gramos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPureza {
    pub peso_inicial: f64,
    pub semilla_pura: f64,
    pub material_inerte: f64,
    pub otros_cultivos: f64,
    pub malezas: f64,
}

impl RepPureza {
    pub fn suma_componentes(&self) -> f64 {
        self.semilla_pura + self.material_inerte + self.otros_cultivos + self.malezas
    }
}

/// La suma de componentes se clasifica contra el peso inicial con la misma
/// banda del resto de los análisis: perder material es advertencia, que
/// aparezca material de más es sospechoso y bloquea.
pub fn validar_pureza(rep: &RepPureza) -> Result<Validacion<f64>, MotivoValidacion> {
    if !(rep.peso_inicial > 0.0) {
        return Err(MotivoValidacion::PesoNoPositivo { peso: rep.peso_inicial });
    }
    clasificar_peso(rep.suma_componentes(), rep.peso_inicial)
}

pub fn validar_para_guardar(rep: &RepPureza) -> Result<Clasificacion, MotivoValidacion> {
    let validacion = validar_pureza(rep)?;
    if validacion.clasificacion.bloquea_guardado() {
        return Err(MotivoValidacion::PesoFueraDeBanda {
            suma: validacion.total,
            minimo: rep.peso_inicial * (1.0 - TOLERANCIA_BANDA),
            maximo: rep.peso_inicial * (1.0 + TOLERANCIA_BANDA),
        });
    }
    Ok(validacion.clasificacion)
}

/// Composición porcentual sobre el peso recuperado de todas las
/// repeticiones juntas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasPureza {
    pub repeticiones: u32,
    pub peso_recuperado: f64,
    pub pct_semilla_pura: f64,
    pub pct_material_inerte: f64,
    pub pct_otros_cultivos: f64,
    pub pct_malezas: f64,
}

pub fn agregar<'a>(reps: impl IntoIterator<Item = &'a RepPureza>) -> EstadisticasPureza {
    let mut n = 0u32;
    let mut semilla_pura = 0.0;
    let mut material_inerte = 0.0;
    let mut otros_cultivos = 0.0;
    let mut malezas = 0.0;
    for rep in reps {
        n += 1;
        semilla_pura += rep.semilla_pura;
        material_inerte += rep.material_inerte;
        otros_cultivos += rep.otros_cultivos;
        malezas += rep.malezas;
    }
    let total = semilla_pura + material_inerte + otros_cultivos + malezas;
    let pct = |parte: f64| if total > 0.0 { parte / total * 100.0 } else { 0.0 };

    EstadisticasPureza {
        repeticiones: n,
        peso_recuperado: total,
        pct_semilla_pura: pct(semilla_pura),
        pct_material_inerte: pct(material_inerte),
        pct_otros_cultivos: pct(otros_cultivos),
        pct_malezas: pct(malezas),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep_base() -> RepPureza {
        RepPureza {
            peso_inicial: 10.0,
            semilla_pura: 9.3,
            material_inerte: 0.4,
            otros_cultivos: 0.15,
            malezas: 0.05,
        }
    }

    #[test]
    fn componentes_dentro_de_banda() {
        let v = validar_pureza(&rep_base()).unwrap(); // suma 9.9 sobre 10.0
        assert_eq!(v.clasificacion, Clasificacion::EnRango);
        assert!((v.total - 9.9).abs() < 1e-9);
    }

    #[test]
    fn perdida_grande_solo_advierte() {
        let rep = RepPureza { semilla_pura: 8.0, ..rep_base() }; // suma 8.6
        assert_eq!(validar_para_guardar(&rep).unwrap(), Clasificacion::DebajoDelMinimo);
    }

    #[test]
    fn material_de_mas_bloquea() {
        let rep = RepPureza { semilla_pura: 10.2, ..rep_base() }; // suma 10.8
        let err = validar_para_guardar(&rep).unwrap_err();
        assert!(matches!(err, MotivoValidacion::PesoFueraDeBanda { .. }));
    }

    #[test]
    fn peso_inicial_no_positivo_se_rechaza() {
        let rep = RepPureza { peso_inicial: 0.0, ..rep_base() };
        assert!(matches!(
            validar_pureza(&rep),
            Err(MotivoValidacion::PesoNoPositivo { .. })
        ));
    }

    #[test]
    fn composicion_porcentual_sobre_lo_recuperado() {
        let stats = agregar([&rep_base(), &rep_base()]);

        assert_eq!(stats.repeticiones, 2);
        assert!((stats.peso_recuperado - 19.8).abs() < 1e-9);
        assert!((stats.pct_semilla_pura - (18.6 / 19.8 * 100.0)).abs() < 1e-9);
        let suma_pct = stats.pct_semilla_pura
            + stats.pct_material_inerte
            + stats.pct_otros_cultivos
            + stats.pct_malezas;
        assert!((suma_pct - 100.0).abs() < 1e-9);
    }
}
