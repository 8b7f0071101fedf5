pub mod dosn;
pub mod estadisticas;
pub mod germinacion;
pub mod pms;
pub mod pureza;
pub mod tetrazolio;
pub mod validacion;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::models::TipoAnalisis;

pub use estadisticas::Estadisticas;
pub use validacion::{Clasificacion, MotivoValidacion};

/// Los datos crudos de una repetición. El tipo viaja como tag, igual que
/// en la configuración del análisis, así el servicio siempre sabe qué
/// forma tiene el resto del objeto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Repeticion {
    Germinacion(germinacion::RepGerminacion),
    Pms(pms::RepPms),
    Tetrazolio(tetrazolio::RepTetrazolio),
    Pureza(pureza::RepPureza),
    Dosn(dosn::RepDosn),
}

impl Repeticion {
    pub fn tipo(&self) -> TipoAnalisis {
        match self {
            Repeticion::Germinacion(_) => TipoAnalisis::Germinacion,
            Repeticion::Pms(_) => TipoAnalisis::Pms,
            Repeticion::Tetrazolio(_) => TipoAnalisis::Tetrazolio,
            Repeticion::Pureza(_) => TipoAnalisis::Pureza,
            Repeticion::Dosn(_) => TipoAnalisis::Dosn,
        }
    }
}

/// Una repetición ya persistida, con el número que ocupa dentro de su
/// análisis o de su tabla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeticionGuardada<T = Repeticion> {
    pub num_rep: u32,
    #[serde(flatten)]
    pub datos: T,
}

impl<T> RepeticionGuardada<T> {
    pub fn nueva(num_rep: u32, datos: T) -> Self {
        RepeticionGuardada { num_rep, datos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analisis::{
            germinacion::RepGerminacion,
            pms::RepPms,
            validacion::{validar_repeticion, MotivoValidacion},
        },
        core::models::ConfigAnalisis,
    };

    fn rep_pms() -> Repeticion {
        Repeticion::Pms(RepPms { peso: 42.0, tanda: 1, valida: true })
    }

    #[test]
    fn repeticion_viaja_con_tag_de_tipo() {
        let json = serde_json::to_value(rep_pms()).unwrap();
        assert_eq!(json["tipo"], "PMS");
        assert_eq!(json["peso"], 42.0);
        assert_eq!(json["tanda"], 1);

        let leida: Repeticion = serde_json::from_value(json).unwrap();
        assert_eq!(leida, rep_pms());
    }

    #[test]
    fn guardada_aplana_sus_datos() {
        let guardada = RepeticionGuardada::nueva(2, rep_pms());
        let json = serde_json::to_value(&guardada).unwrap();
        assert_eq!(json["numRep"], 2);
        assert_eq!(json["tipo"], "PMS");

        let leida: RepeticionGuardada = serde_json::from_value(json).unwrap();
        assert_eq!(leida, guardada);
    }

    #[test]
    fn dispatch_valida_contra_la_config_del_analisis() {
        let config = ConfigAnalisis::Pms { num_tandas: 2 };
        assert!(validar_repeticion(&rep_pms(), &config).is_ok());
    }

    #[test]
    fn dispatch_rechaza_tipos_cruzados() {
        let config = ConfigAnalisis::Pureza { num_repeticiones: 2 };
        assert_eq!(
            validar_repeticion(&rep_pms(), &config),
            Err(MotivoValidacion::TipoIncompatible {
                esperado: crate::core::models::TipoAnalisis::Pureza,
                recibido: crate::core::models::TipoAnalisis::Pms,
            })
        );
    }

    #[test]
    fn dispatch_deriva_germinacion_a_su_tabla() {
        let config = ConfigAnalisis::Germinacion { num_tablas: 1 };
        let rep = Repeticion::Germinacion(RepGerminacion {
            normales: vec![60, 20, 10],
            anormales: 2,
            duras: 1,
            frescas: 1,
            muertas: 1,
        });
        assert_eq!(
            validar_repeticion(&rep, &config),
            Err(MotivoValidacion::GerminacionRequiereTabla)
        );
    }
}
