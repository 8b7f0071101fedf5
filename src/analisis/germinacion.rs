use chrono::NaiveDate;
use serde::{
    Deserialize,
    Serialize,
};

use crate::analisis::{
    estadisticas::media,
    validacion::{
        banda_tolerancia,
        clasificar_total,
        Clasificacion,
        MotivoValidacion,
        Validacion,
    },
    RepeticionGuardada,
};

/// Una repetición de germinación: los conteos de plántulas normales por
/// fecha, más las categorías que se cuentan una sola vez al final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepGerminacion {
    pub normales: Vec<u32>,
    pub anormales: u32,
    pub duras: u32,
    pub frescas: u32,
    pub muertas: u32,
}

impl RepGerminacion {
    pub fn total_normales(&self) -> u32 {
        self.normales.iter().sum()
    }

    pub fn total(&self) -> u32 {
        self.total_normales() + self.anormales + self.duras + self.frescas + self.muertas
    }
}

/// Porcentajes finales de una tabla. Los carga el analista a mano cuando la
/// tabla ya está finalizada; son enteros y tienen que sumar exactamente 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PorcentajesGerminacion {
    pub normales: u32,
    pub anormales: u32,
    pub duras: u32,
    pub frescas: u32,
    pub muertas: u32,
}

impl PorcentajesGerminacion {
    pub fn suma(&self) -> u32 {
        self.normales + self.anormales + self.duras + self.frescas + self.muertas
    }
}

/// Tabla de germinación: agrupa repeticiones sembradas juntas, con un
/// cronograma de conteos compartido. El largo de `conteos` define cuántos
/// valores de normales tiene que traer cada repetición.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablaGerminacion {
    pub numero: u32,
    pub num_semillas_p_rep: u32,
    pub num_repeticiones: u32,
    pub conteos: Vec<NaiveDate>,
    pub finalizada: bool,
    #[serde(default)]
    pub porcentajes: Option<PorcentajesGerminacion>,
    #[serde(default)]
    pub repeticiones: Vec<RepeticionGuardada<RepGerminacion>>,
}

impl TablaGerminacion {
    pub fn nueva(
        numero: u32,
        num_semillas_p_rep: u32,
        num_repeticiones: u32,
        conteos: Vec<NaiveDate>,
    ) -> Self {
        TablaGerminacion {
            numero,
            num_semillas_p_rep,
            num_repeticiones,
            conteos,
            finalizada: false,
            porcentajes: None,
            repeticiones: Vec::new(),
        }
    }

    pub fn num_conteos(&self) -> usize {
        self.conteos.len()
    }

    pub fn completa(&self) -> bool {
        self.repeticiones.len() as u32 >= self.num_repeticiones
    }

    pub fn estadisticas(&self) -> EstadisticasGerminacion {
        agregar(self.repeticiones.iter().map(|rep| &rep.datos))
    }

    pub fn porcentajes_crudos(&self) -> PorcentajesCrudos {
        self.estadisticas().porcentajes_crudos(self.num_semillas_p_rep)
    }
}

/// Valida una repetición contra su tabla. La tabla tiene que estar abierta
/// y el cronograma de conteos tiene que coincidir.
pub fn validar_germinacion(
    rep: &RepGerminacion,
    tabla: &TablaGerminacion,
) -> Result<Validacion<u32>, MotivoValidacion> {
    if tabla.finalizada {
        return Err(MotivoValidacion::TablaFinalizada { numero: tabla.numero });
    }
    if rep.normales.len() != tabla.num_conteos() {
        return Err(MotivoValidacion::ConteosInesperados {
            esperados: tabla.num_conteos(),
            recibidos: rep.normales.len(),
        });
    }
    clasificar_total(rep.total(), tabla.num_semillas_p_rep)
}

/// Como [`validar_germinacion`], pero con la política de guardado aplicada:
/// exceder la banda es un error, quedarse corto solo clasifica.
pub fn validar_para_guardar(
    rep: &RepGerminacion,
    tabla: &TablaGerminacion,
) -> Result<Clasificacion, MotivoValidacion> {
    let validacion = validar_germinacion(rep, tabla)?;
    if validacion.clasificacion.bloquea_guardado() {
        let (_, maximo) = banda_tolerancia(tabla.num_semillas_p_rep);
        return Err(MotivoValidacion::TotalExcedeMaximo { total: validacion.total, maximo });
    }
    Ok(validacion.clasificacion)
}

/// Chequea que unos porcentajes finales puedan cargarse sobre la tabla.
pub fn aceptar_porcentajes(
    tabla: &TablaGerminacion,
    porcentajes: &PorcentajesGerminacion,
) -> Result<(), MotivoValidacion> {
    if !tabla.finalizada {
        return Err(MotivoValidacion::TablaNoFinalizada { numero: tabla.numero });
    }
    let suma = porcentajes.suma();
    if suma != 100 {
        return Err(MotivoValidacion::PorcentajesNoSuman100 { suma });
    }
    Ok(())
}

/// Promedios por categoría y por fecha de conteo sobre las repeticiones de
/// una tabla.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasGerminacion {
    pub repeticiones: u32,
    pub promedio_normales: f64,
    pub promedio_anormales: f64,
    pub promedio_duras: f64,
    pub promedio_frescas: f64,
    pub promedio_muertas: f64,
    /// Promedio de normales en cada fecha del cronograma, en orden.
    pub promedio_por_conteo: Vec<f64>,
}

/// Porcentajes sin redondear sobre las semillas sembradas por repetición.
/// Son la referencia contra la que el analista redondea los finales.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PorcentajesCrudos {
    pub normales: f64,
    pub anormales: f64,
    pub duras: f64,
    pub frescas: f64,
    pub muertas: f64,
}

impl EstadisticasGerminacion {
    pub fn porcentajes_crudos(&self, num_semillas_p_rep: u32) -> PorcentajesCrudos {
        let pct = |promedio: f64| {
            if num_semillas_p_rep == 0 {
                0.0
            } else {
                promedio / num_semillas_p_rep as f64 * 100.0
            }
        };
        PorcentajesCrudos {
            normales: pct(self.promedio_normales),
            anormales: pct(self.promedio_anormales),
            duras: pct(self.promedio_duras),
            frescas: pct(self.promedio_frescas),
            muertas: pct(self.promedio_muertas),
        }
    }
}

pub fn agregar<'a>(reps: impl IntoIterator<Item = &'a RepGerminacion>) -> EstadisticasGerminacion {
    let reps: Vec<&RepGerminacion> = reps.into_iter().collect();
    let n = reps.len();

    let num_conteos = reps.iter().map(|rep| rep.normales.len()).max().unwrap_or(0);
    let mut promedio_por_conteo = Vec::with_capacity(num_conteos);
    for idx in 0..num_conteos {
        let valores: Vec<f64> = reps
            .iter()
            .map(|rep| rep.normales.get(idx).copied().unwrap_or(0) as f64)
            .collect();
        promedio_por_conteo.push(media(&valores));
    }

    let promedio_de = |extraer: fn(&RepGerminacion) -> u32| {
        let valores: Vec<f64> = reps.iter().map(|rep| extraer(rep) as f64).collect();
        media(&valores)
    };

    EstadisticasGerminacion {
        repeticiones: n as u32,
        promedio_normales: promedio_de(RepGerminacion::total_normales),
        promedio_anormales: promedio_de(|rep| rep.anormales),
        promedio_duras: promedio_de(|rep| rep.duras),
        promedio_frescas: promedio_de(|rep| rep.frescas),
        promedio_muertas: promedio_de(|rep| rep.muertas),
        promedio_por_conteo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fecha(dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, dia).unwrap()
    }

    fn tabla_de_100() -> TablaGerminacion {
        TablaGerminacion::nueva(1, 100, 4, vec![fecha(10), fecha(14), fecha(17)])
    }

    fn rep(normales: Vec<u32>, anormales: u32, duras: u32, frescas: u32, muertas: u32) -> RepGerminacion {
        RepGerminacion { normales, anormales, duras, frescas, muertas }
    }

    #[test]
    fn total_suma_todas_las_categorias() {
        let r = rep(vec![60, 20, 10], 4, 3, 2, 1);
        assert_eq!(r.total_normales(), 90);
        assert_eq!(r.total(), 100);
    }

    #[test]
    fn en_banda_se_acepta() {
        let tabla = tabla_de_100();
        let v = validar_germinacion(&rep(vec![60, 20, 10], 2, 1, 1, 1), &tabla).unwrap();
        assert_eq!(v.total, 95);
        assert_eq!(v.clasificacion, Clasificacion::EnRango);
    }

    #[test]
    fn debajo_de_banda_clasifica_sin_bloquear() {
        let tabla = tabla_de_100();
        let r = rep(vec![50, 20, 10], 2, 1, 0, 1); // total 84
        let clasificacion = validar_para_guardar(&r, &tabla).unwrap();
        assert_eq!(clasificacion, Clasificacion::DebajoDelMinimo);
    }

    #[test]
    fn exceso_de_banda_bloquea_el_guardado() {
        let tabla = tabla_de_100();
        let r = rep(vec![70, 20, 10], 3, 2, 1, 0); // total 106
        assert_eq!(
            validar_para_guardar(&r, &tabla),
            Err(MotivoValidacion::TotalExcedeMaximo { total: 106, maximo: 105 })
        );
    }

    #[test]
    fn repeticion_vacia_se_rechaza() {
        let tabla = tabla_de_100();
        let r = rep(vec![0, 0, 0], 0, 0, 0, 0);
        assert_eq!(validar_germinacion(&r, &tabla), Err(MotivoValidacion::TotalCero));
    }

    #[test]
    fn cronograma_distinto_se_rechaza() {
        let tabla = tabla_de_100();
        let r = rep(vec![60, 35], 2, 1, 1, 1); // dos conteos, la tabla pide tres
        assert_eq!(
            validar_germinacion(&r, &tabla),
            Err(MotivoValidacion::ConteosInesperados { esperados: 3, recibidos: 2 })
        );
    }

    #[test]
    fn tabla_finalizada_no_acepta_conteos() {
        let mut tabla = tabla_de_100();
        tabla.finalizada = true;
        let r = rep(vec![60, 20, 10], 2, 1, 1, 1);
        assert_eq!(
            validar_germinacion(&r, &tabla),
            Err(MotivoValidacion::TablaFinalizada { numero: 1 })
        );
    }

    #[test]
    fn porcentajes_requieren_tabla_finalizada() {
        let tabla = tabla_de_100();
        let p = PorcentajesGerminacion { normales: 90, anormales: 4, duras: 3, frescas: 2, muertas: 1 };
        assert_eq!(
            aceptar_porcentajes(&tabla, &p),
            Err(MotivoValidacion::TablaNoFinalizada { numero: 1 })
        );
    }

    #[test]
    fn porcentajes_deben_sumar_cien() {
        let mut tabla = tabla_de_100();
        tabla.finalizada = true;

        let bien = PorcentajesGerminacion { normales: 90, anormales: 5, duras: 2, frescas: 1, muertas: 2 };
        assert!(aceptar_porcentajes(&tabla, &bien).is_ok());

        let mal = PorcentajesGerminacion { normales: 90, anormales: 8, duras: 3, frescas: 2, muertas: 1 };
        assert_eq!(
            aceptar_porcentajes(&tabla, &mal),
            Err(MotivoValidacion::PorcentajesNoSuman100 { suma: 104 })
        );
    }

    #[test]
    fn repeticion_identica_tras_serializar() {
        let original = rep(vec![30, 35, 30], 0, 0, 0, 0);
        let v = validar_germinacion(&original, &tabla_de_100()).unwrap();
        assert_eq!(v.total, 95);
        assert_eq!(v.clasificacion, Clasificacion::EnRango);

        let json = serde_json::to_string(&original).unwrap();
        let leida: RepGerminacion = serde_json::from_str(&json).unwrap();
        assert_eq!(leida, original);
    }

    #[test]
    fn promedios_por_categoria_y_por_conteo() {
        let stats = agregar([
            &rep(vec![60, 20, 10], 4, 3, 2, 1),
            &rep(vec![50, 30, 10], 2, 5, 2, 1),
        ]);

        assert_eq!(stats.repeticiones, 2);
        assert_eq!(stats.promedio_normales, 90.0);
        assert_eq!(stats.promedio_anormales, 3.0);
        assert_eq!(stats.promedio_duras, 4.0);
        assert_eq!(stats.promedio_por_conteo, vec![55.0, 25.0, 10.0]);
    }

    #[test]
    fn tabla_completa_cuando_junta_sus_repeticiones() {
        let mut tabla = tabla_de_100();
        assert!(!tabla.completa());
        for num_rep in 1..=4 {
            tabla.repeticiones.push(RepeticionGuardada::nueva(
                num_rep,
                rep(vec![60, 20, 10], 2, 1, 1, 1),
            ));
        }
        assert!(tabla.completa());
        assert_eq!(tabla.estadisticas().repeticiones, 4);
    }

    #[test]
    fn porcentajes_crudos_sobre_las_semillas_sembradas() {
        let mut tabla = tabla_de_100();
        tabla.repeticiones.push(RepeticionGuardada::nueva(1, rep(vec![60, 20, 10], 4, 3, 2, 1)));
        tabla.repeticiones.push(RepeticionGuardada::nueva(2, rep(vec![50, 30, 10], 2, 5, 2, 1)));

        let crudos = tabla.porcentajes_crudos();
        assert_eq!(crudos.normales, 90.0);
        assert_eq!(crudos.anormales, 3.0);
        assert_eq!(crudos.duras, 4.0);
        assert_eq!(crudos.frescas, 2.0);
        assert_eq!(crudos.muertas, 1.0);
    }
}
