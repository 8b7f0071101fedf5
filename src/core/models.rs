use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

/// Estados del ciclo de vida de un análisis, tal como los persiste el servicio.
///
/// `FINALIZADO` es el nombre histórico de `PENDIENTE_APROBACION` y todavía
/// aparece en respuestas de instancias viejas del servicio, por eso el alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estado {
    #[serde(rename = "REGISTRADO")]
    Registrado,
    #[serde(rename = "EN_PROCESO")]
    EnProceso,
    #[serde(rename = "PENDIENTE_APROBACION", alias = "FINALIZADO")]
    PendienteAprobacion,
    #[serde(rename = "APROBADO")]
    Aprobado,
    #[serde(rename = "A_REPETIR")]
    ARepetir,
}

impl Estado {
    pub fn permite_edicion(&self) -> bool {
        matches!(self, Estado::Registrado | Estado::EnProceso | Estado::ARepetir)
    }

    pub fn etiqueta(&self) -> &'static str {
        match self {
            Estado::Registrado => "REGISTRADO",
            Estado::EnProceso => "EN_PROCESO",
            Estado::PendienteAprobacion => "PENDIENTE_APROBACION",
            Estado::Aprobado => "APROBADO",
            Estado::ARepetir => "A_REPETIR",
        }
    }

    /// Texto para pantallas y notificaciones. En el laboratorio a
    /// PENDIENTE_APROBACION se lo sigue llamando "finalizado".
    pub fn etiqueta_usuario(&self) -> &'static str {
        match self {
            Estado::Registrado => "Registrado",
            Estado::EnProceso => "En proceso",
            Estado::PendienteAprobacion => "Finalizado",
            Estado::Aprobado => "Aprobado",
            Estado::ARepetir => "A repetir",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.etiqueta())
    }
}

/// Acciones de workflow que puede pedir un usuario sobre un análisis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accion {
    Finalizar,
    Aprobar,
    MarcarParaRepetir,
    FinalizarYAprobar,
    Reabrir,
}

impl Accion {
    pub fn etiqueta(&self) -> &'static str {
        match self {
            Accion::Finalizar => "finalizar",
            Accion::Aprobar => "aprobar",
            Accion::MarcarParaRepetir => "marcar para repetir",
            Accion::FinalizarYAprobar => "finalizar y aprobar",
            Accion::Reabrir => "reabrir",
        }
    }

    pub fn requiere_confirmacion(&self) -> bool {
        matches!(self, Accion::Finalizar | Accion::FinalizarYAprobar | Accion::Reabrir)
    }

    /// Llamadas que hay que hacerle al servicio para cumplir la acción.
    /// `FinalizarYAprobar` es un atajo de UI: contra el servicio son dos
    /// transiciones encadenadas.
    pub fn pasos_remotos(&self) -> &'static [AccionRemota] {
        match self {
            Accion::Finalizar => &[AccionRemota::Finalizar],
            Accion::Aprobar => &[AccionRemota::Aprobar],
            Accion::MarcarParaRepetir => &[AccionRemota::MarcarParaRepetir],
            Accion::FinalizarYAprobar => &[AccionRemota::Finalizar, AccionRemota::Aprobar],
            Accion::Reabrir => &[AccionRemota::Reabrir],
        }
    }
}

impl fmt::Display for Accion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.etiqueta())
    }
}

/// Transiciones que el servicio expone en su endpoint de workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccionRemota {
    Finalizar,
    Aprobar,
    MarcarParaRepetir,
    Reabrir,
}

/// Roles del laboratorio, de menor a mayor privilegio. El orden de los
/// variantes define `Ord`, no reordenar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rol {
    Analista,
    Supervisor,
    Administrador,
}

impl Rol {
    pub fn etiqueta(&self) -> &'static str {
        match self {
            Rol::Analista => "analista",
            Rol::Supervisor => "supervisor",
            Rol::Administrador => "administrador",
        }
    }
}

impl fmt::Display for Rol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.etiqueta())
    }
}

/// Quién está operando: nombre de usuario más el rol con el que entró.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub nombre: String,
    pub rol: Rol,
}

impl Actor {
    pub fn new(nombre: impl Into<String>, rol: Rol) -> Self {
        Actor { nombre: nombre.into(), rol }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAnalisis {
    Germinacion,
    Pms,
    Tetrazolio,
    Pureza,
    Dosn,
}

impl TipoAnalisis {
    pub fn etiqueta(&self) -> &'static str {
        match self {
            TipoAnalisis::Germinacion => "Germinación",
            TipoAnalisis::Pms => "PMS",
            TipoAnalisis::Tetrazolio => "Tetrazolio",
            TipoAnalisis::Pureza => "Pureza",
            TipoAnalisis::Dosn => "DOSN",
        }
    }
}

impl fmt::Display for TipoAnalisis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.etiqueta())
    }
}

/// Parámetros propios de cada tipo de análisis. El tipo viaja como tag del
/// enum, así que un análisis no puede cambiar de tipo sin reconstruirse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigAnalisis {
    #[serde(rename_all = "camelCase")]
    Germinacion { num_tablas: u32 },
    #[serde(rename_all = "camelCase")]
    Pms { num_tandas: u32 },
    #[serde(rename_all = "camelCase")]
    Tetrazolio {
        semillas_por_rep: u32,
        num_repeticiones: u32,
        /// Viabilidad de referencia del ente certificador, si se conoce.
        /// Se carga a mano, nunca se calcula.
        viabilidad_inase: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Pureza { num_repeticiones: u32 },
    #[serde(rename_all = "camelCase")]
    Dosn { num_repeticiones: u32 },
}

impl ConfigAnalisis {
    pub fn tipo(&self) -> TipoAnalisis {
        match self {
            ConfigAnalisis::Germinacion { .. } => TipoAnalisis::Germinacion,
            ConfigAnalisis::Pms { .. } => TipoAnalisis::Pms,
            ConfigAnalisis::Tetrazolio { .. } => TipoAnalisis::Tetrazolio,
            ConfigAnalisis::Pureza { .. } => TipoAnalisis::Pureza,
            ConfigAnalisis::Dosn { .. } => TipoAnalisis::Dosn,
        }
    }
}

/// Lote de semillas sobre el que se corre el análisis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lote {
    pub id: u64,
    /// Código con formato `PREFIJO-NNNN/AAAA`, por ejemplo `TRI-0042/2025`.
    pub codigo: String,
    #[serde(default)]
    pub especie: Option<String>,
}

/// Partes del código de lote, cuando el código respeta el formato estándar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentesCodigo {
    pub prefijo: String,
    pub numero: u32,
    pub campania: u32,
}

impl Lote {
    pub fn new(id: u64, codigo: impl Into<String>) -> Self {
        Lote { id, codigo: codigo.into(), especie: None }
    }

    /// Descompone el código del lote. Devuelve `None` si el código no sigue
    /// el formato estándar (hay lotes históricos cargados a mano).
    pub fn componentes(&self) -> Option<ComponentesCodigo> {
        let re = Regex::new(r"^([A-Za-z]{2,4})-(\d{1,5})/(\d{4})$").ok()?;
        let caps = re.captures(self.codigo.trim())?;
        Some(ComponentesCodigo {
            prefijo: caps.get(1)?.as_str().to_uppercase(),
            numero: caps.get(2)?.as_str().parse().ok()?,
            campania: caps.get(3)?.as_str().parse().ok()?,
        })
    }

    pub fn descripcion(&self) -> String {
        match &self.especie {
            Some(especie) => format!("{} ({})", self.codigo, especie),
            None => self.codigo.clone(),
        }
    }
}

/// Evento de workflow ya aplicado, para el historial del análisis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntradaHistorial {
    pub id: Uuid,
    pub fecha: DateTime<Utc>,
    pub accion: Accion,
    pub actor: String,
}

impl EntradaHistorial {
    pub fn nueva(accion: Accion, actor: &Actor) -> Self {
        EntradaHistorial {
            id: Uuid::new_v4(),
            fecha: Utc::now(),
            accion,
            actor: actor.nombre.clone(),
        }
    }
}

/// Un análisis tal como lo devuelve el servicio, con la configuración del
/// tipo aplanada en el mismo objeto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analisis {
    pub id: u64,
    pub estado: Estado,
    pub lote: Lote,
    #[serde(flatten)]
    pub config: ConfigAnalisis,
    #[serde(default)]
    pub fecha_inicio: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fecha_fin: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comentarios: Option<String>,
    #[serde(default)]
    pub historial: Vec<EntradaHistorial>,
}

impl Analisis {
    pub fn nuevo(id: u64, lote: Lote, config: ConfigAnalisis) -> Self {
        Analisis {
            id,
            estado: Estado::Registrado,
            lote,
            config,
            fecha_inicio: None,
            fecha_fin: None,
            comentarios: None,
            historial: Vec::new(),
        }
    }

    pub fn tipo(&self) -> TipoAnalisis {
        self.config.tipo()
    }

    pub fn permite_edicion(&self) -> bool {
        self.estado.permite_edicion()
    }

    pub fn registrar(&mut self, accion: Accion, actor: &Actor) {
        self.historial.push(EntradaHistorial::nueva(accion, actor));
    }
}
