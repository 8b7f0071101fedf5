use thiserror::Error;

use crate::{
    analisis::{
        germinacion::TablaGerminacion,
        pms,
        Repeticion,
        RepeticionGuardada,
    },
    core::models::{
        Accion,
        Analisis,
        ConfigAnalisis,
        Estado,
        Rol,
    },
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotivoGuarda {
    #[error("no se puede {accion} desde el estado {desde}")]
    AccionNoPermitida { desde: Estado, accion: Accion },

    #[error("{accion} requiere rol {requerido} o superior")]
    RolInsuficiente { accion: Accion, requerido: Rol },

    #[error("el análisis está {0} y no admite edición")]
    EdicionBloqueada(Estado),

    #[error("faltan repeticiones: se esperaban {esperadas} y hay {guardadas}")]
    RepeticionesIncompletas { esperadas: u32, guardadas: u32 },

    #[error("faltan tablas de germinación: se esperaban {esperadas} y hay {presentes}")]
    TablasIncompletas { esperadas: u32, presentes: u32 },

    #[error("la tabla {numero} tiene {guardadas} de {esperadas} repeticiones")]
    TablaIncompleta { numero: u32, esperadas: u32, guardadas: u32 },

    #[error("la tabla {numero} sigue abierta, hay que finalizarla antes")]
    TablaSinFinalizar { numero: u32 },

    #[error("faltan tandas con pesadas válidas: se esperaban {esperadas} y hay {presentes}")]
    TandasIncompletas { esperadas: u32, presentes: u32 },
}

/// Mínimo rol que puede pedir cada acción. Aprobar y sus parientes son
/// decisiones de supervisión; el atajo de finalizar y aprobar en un paso
/// queda reservado a administración.
pub fn rol_requerido(accion: Accion) -> Rol {
    match accion {
        Accion::Finalizar | Accion::Reabrir => Rol::Analista,
        Accion::Aprobar | Accion::MarcarParaRepetir => Rol::Supervisor,
        Accion::FinalizarYAprobar => Rol::Administrador,
    }
}

/// Resuelve a qué estado llevaría una acción, o por qué no se puede.
///
/// El estado se chequea antes que el rol: pedir de nuevo una acción ya
/// aplicada responde "no permitida desde este estado" sin importar quién
/// lo pida.
pub fn verificar_transicion(
    desde: Estado,
    accion: Accion,
    rol: Rol,
) -> Result<Estado, MotivoGuarda> {
    let destino = match (desde, accion) {
        (Estado::Registrado | Estado::EnProceso, Accion::Finalizar) => Estado::PendienteAprobacion,
        (Estado::PendienteAprobacion, Accion::Aprobar) => Estado::Aprobado,
        (Estado::EnProceso | Estado::PendienteAprobacion, Accion::MarcarParaRepetir) => {
            Estado::ARepetir
        }
        (Estado::EnProceso, Accion::FinalizarYAprobar) => Estado::Aprobado,
        (Estado::Aprobado | Estado::PendienteAprobacion | Estado::ARepetir, Accion::Reabrir) => {
            Estado::EnProceso
        }
        _ => return Err(MotivoGuarda::AccionNoPermitida { desde, accion }),
    };

    let requerido = rol_requerido(accion);
    if rol < requerido {
        return Err(MotivoGuarda::RolInsuficiente { accion, requerido });
    }
    Ok(destino)
}

/// Todo lo cargado de un análisis: sus tablas de germinación y sus
/// repeticiones sueltas. Según el tipo, una de las dos listas viene vacía.
#[derive(Debug, Clone, Default)]
pub struct DatosAnalisis {
    pub tablas: Vec<TablaGerminacion>,
    pub repeticiones: Vec<RepeticionGuardada>,
}

/// Chequea que el análisis tenga todos los datos que su configuración
/// promete. Se corre antes de finalizar; las demás acciones no miran datos.
pub fn verificar_completitud(analisis: &Analisis, datos: &DatosAnalisis) -> Result<(), MotivoGuarda> {
    match &analisis.config {
        ConfigAnalisis::Germinacion { num_tablas } => {
            let presentes = datos.tablas.len() as u32;
            if presentes < *num_tablas {
                return Err(MotivoGuarda::TablasIncompletas {
                    esperadas: *num_tablas,
                    presentes,
                });
            }
            for tabla in &datos.tablas {
                let guardadas = tabla.repeticiones.len() as u32;
                if guardadas < tabla.num_repeticiones {
                    return Err(MotivoGuarda::TablaIncompleta {
                        numero: tabla.numero,
                        esperadas: tabla.num_repeticiones,
                        guardadas,
                    });
                }
                if !tabla.finalizada {
                    return Err(MotivoGuarda::TablaSinFinalizar { numero: tabla.numero });
                }
            }
            Ok(())
        }
        ConfigAnalisis::Pms { num_tandas } => {
            let presentes = pms::tandas_presentes(datos.repeticiones.iter().filter_map(
                |rep| match &rep.datos {
                    Repeticion::Pms(pesada) => Some(pesada),
                    _ => None,
                },
            ));
            let presentes = presentes.len() as u32;
            if presentes != *num_tandas {
                return Err(MotivoGuarda::TandasIncompletas {
                    esperadas: *num_tandas,
                    presentes,
                });
            }
            Ok(())
        }
        ConfigAnalisis::Tetrazolio { num_repeticiones, .. }
        | ConfigAnalisis::Pureza { num_repeticiones }
        | ConfigAnalisis::Dosn { num_repeticiones } => {
            let tipo = analisis.tipo();
            let guardadas =
                datos.repeticiones.iter().filter(|rep| rep.datos.tipo() == tipo).count() as u32;
            if guardadas < *num_repeticiones {
                return Err(MotivoGuarda::RepeticionesIncompletas {
                    esperadas: *num_repeticiones,
                    guardadas,
                });
            }
            Ok(())
        }
    }
}
