use std::sync::Arc;

use futures::future::try_join;
use log::{
    debug,
    info,
};

use crate::{
    analisis::{
        germinacion::{
            self,
            PorcentajesGerminacion,
            RepGerminacion,
            TablaGerminacion,
        },
        validacion::{
            validar_repeticion,
            Clasificacion,
            MotivoValidacion,
        },
        Repeticion,
        RepeticionGuardada,
    },
    api::AnalisisApi,
    core::{
        errors::SemlabError,
        models::{
            Accion,
            Actor,
            Analisis,
            TipoAnalisis,
        },
    },
    workflow::estados::{
        verificar_completitud,
        verificar_transicion,
        DatosAnalisis,
        MotivoGuarda,
    },
};

/// Pregunta de sí o no que la UI le muestra al usuario antes de una acción
/// difícil de deshacer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmacion {
    pub titulo: String,
    pub mensaje: String,
    pub variante: VarianteConfirmacion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianteConfirmacion {
    Advertencia,
    Peligro,
}

impl Confirmacion {
    fn nueva(
        titulo: impl Into<String>,
        mensaje: impl Into<String>,
        variante: VarianteConfirmacion,
    ) -> Self {
        Confirmacion { titulo: titulo.into(), mensaje: mensaje.into(), variante }
    }
}

/// Quien pueda mostrar la pregunta y devolver la respuesta del usuario.
pub trait Confirmador: Send + Sync {
    fn confirmar(&self, solicitud: &Confirmacion) -> bool;
}

/// Salida hacia el usuario. Cada operación termina en a lo sumo una
/// notificación: éxito o advertencia si se aplicó, error si falló,
/// nada si se canceló.
pub trait Notificador: Send + Sync {
    fn exito(&self, mensaje: &str);
    fn advertencia(&self, mensaje: &str);
    fn error(&self, mensaje: &str);
}

/// Cómo terminó una operación que pasa por confirmación: aplicada con su
/// resultado, o cancelada por el usuario sin tocar nada.
#[derive(Debug, Clone, PartialEq)]
pub enum Desenlace<T> {
    Aplicado(T),
    Cancelado,
}

impl<T> Desenlace<T> {
    pub fn fue_aplicado(&self) -> bool {
        matches!(self, Desenlace::Aplicado(_))
    }

    pub fn aplicado(self) -> Option<T> {
        match self {
            Desenlace::Aplicado(valor) => Some(valor),
            Desenlace::Cancelado => None,
        }
    }
}

/// Coordina cada operación de punta a punta: carga el análisis, corre las
/// guardas locales, pide confirmación si hace falta y recién ahí le habla
/// al servicio. El servicio es el único dueño del estado persistido.
pub struct Orquestador {
    api: Arc<dyn AnalisisApi>,
    confirmador: Arc<dyn Confirmador>,
    notificador: Arc<dyn Notificador>,
}

impl Orquestador {
    pub fn new(
        api: Arc<dyn AnalisisApi>,
        confirmador: Arc<dyn Confirmador>,
        notificador: Arc<dyn Notificador>,
    ) -> Self {
        Orquestador { api, confirmador, notificador }
    }

    /// Aplica una acción de workflow sobre un análisis.
    pub async fn ejecutar(
        &self,
        id: u64,
        accion: Accion,
        actor: &Actor,
    ) -> Result<Desenlace<Analisis>, SemlabError> {
        match self.ejecutar_interno(id, accion, actor).await {
            Ok(Desenlace::Aplicado(analisis)) => {
                self.notificador.exito(&mensaje_exito(accion, id));
                Ok(Desenlace::Aplicado(analisis))
            }
            Ok(Desenlace::Cancelado) => {
                debug!("{} sobre el análisis {} cancelado por el usuario", accion, id);
                Ok(Desenlace::Cancelado)
            }
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn ejecutar_interno(
        &self,
        id: u64,
        accion: Accion,
        actor: &Actor,
    ) -> Result<Desenlace<Analisis>, SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        verificar_transicion(analisis.estado, accion, actor.rol)?;

        // Finalizar es la única acción que exige tener todos los datos.
        if matches!(accion, Accion::Finalizar | Accion::FinalizarYAprobar) {
            let datos = self.cargar_datos(id).await?;
            verificar_completitud(&analisis, &datos)?;
        }

        if accion.requiere_confirmacion() {
            let solicitud = confirmacion_de(accion, &analisis);
            if !self.confirmador.confirmar(&solicitud) {
                return Ok(Desenlace::Cancelado);
            }
        }

        let mut actual = analisis;
        for paso in accion.pasos_remotos() {
            actual = self.api.transicionar(id, *paso, actor).await?;
        }
        actual.registrar(accion, actor);
        info!("análisis {}: {} aplicado, queda {}", id, accion, actual.estado);
        Ok(Desenlace::Aplicado(actual))
    }

    /// Tablas y repeticiones guardadas del análisis, en paralelo.
    pub async fn cargar_datos(&self, id: u64) -> Result<DatosAnalisis, SemlabError> {
        let (tablas, repeticiones) =
            try_join(self.api.listar_tablas(id), self.api.listar_repeticiones(id)).await?;
        Ok(DatosAnalisis { tablas, repeticiones })
    }

    /// Guarda una repetición suelta (PMS, tetrazolio, pureza o DOSN).
    /// Un total por debajo de la banda se guarda igual pero avisa.
    pub async fn guardar_repeticion(
        &self,
        id: u64,
        num_rep: u32,
        rep: Repeticion,
    ) -> Result<RepeticionGuardada, SemlabError> {
        match self.guardar_repeticion_interno(id, num_rep, rep).await {
            Ok((guardada, clasificacion)) => {
                self.notificar_guardado(num_rep, clasificacion);
                Ok(guardada)
            }
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn guardar_repeticion_interno(
        &self,
        id: u64,
        num_rep: u32,
        rep: Repeticion,
    ) -> Result<(RepeticionGuardada, Clasificacion), SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        if !analisis.permite_edicion() {
            return Err(MotivoGuarda::EdicionBloqueada(analisis.estado).into());
        }
        let clasificacion = validar_repeticion(&rep, &analisis.config)?;
        let guardada =
            self.api.guardar_repeticion(id, &RepeticionGuardada::nueva(num_rep, rep)).await?;
        Ok((guardada, clasificacion))
    }

    /// Guarda una repetición de germinación dentro de su tabla.
    pub async fn guardar_repeticion_germinacion(
        &self,
        id: u64,
        numero_tabla: u32,
        num_rep: u32,
        rep: RepGerminacion,
    ) -> Result<RepeticionGuardada<RepGerminacion>, SemlabError> {
        match self.guardar_germinacion_interno(id, numero_tabla, num_rep, rep).await {
            Ok((guardada, clasificacion)) => {
                self.notificar_guardado(num_rep, clasificacion);
                Ok(guardada)
            }
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn guardar_germinacion_interno(
        &self,
        id: u64,
        numero_tabla: u32,
        num_rep: u32,
        rep: RepGerminacion,
    ) -> Result<(RepeticionGuardada<RepGerminacion>, Clasificacion), SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        exigir_germinacion(&analisis)?;
        if !analisis.permite_edicion() {
            return Err(MotivoGuarda::EdicionBloqueada(analisis.estado).into());
        }
        let tablas = self.api.listar_tablas(id).await?;
        let tabla = tablas
            .iter()
            .find(|tabla| tabla.numero == numero_tabla)
            .ok_or(SemlabError::TablaNoEncontrada { analisis: id, numero: numero_tabla })?;

        let clasificacion = germinacion::validar_para_guardar(&rep, tabla)?;
        let guardada = self
            .api
            .guardar_repeticion_tabla(id, numero_tabla, &RepeticionGuardada::nueva(num_rep, rep))
            .await?;
        Ok((guardada, clasificacion))
    }

    /// Borra una repetición guardada, previa confirmación.
    pub async fn eliminar_repeticion(
        &self,
        id: u64,
        num_rep: u32,
    ) -> Result<Desenlace<()>, SemlabError> {
        match self.eliminar_interno(id, num_rep).await {
            Ok(Desenlace::Aplicado(())) => {
                self.notificador.exito(&format!("Repetición {} eliminada", num_rep));
                Ok(Desenlace::Aplicado(()))
            }
            Ok(Desenlace::Cancelado) => Ok(Desenlace::Cancelado),
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn eliminar_interno(&self, id: u64, num_rep: u32) -> Result<Desenlace<()>, SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        if !analisis.permite_edicion() {
            return Err(MotivoGuarda::EdicionBloqueada(analisis.estado).into());
        }
        let solicitud = Confirmacion::nueva(
            "Eliminar repetición",
            format!("La repetición {} del análisis {} se borra definitivamente. ¿Continuar?", num_rep, id),
            VarianteConfirmacion::Peligro,
        );
        if !self.confirmador.confirmar(&solicitud) {
            return Ok(Desenlace::Cancelado);
        }
        self.api.eliminar_repeticion(id, num_rep).await?;
        Ok(Desenlace::Aplicado(()))
    }

    /// Crea o actualiza una tabla de germinación. Una tabla finalizada ya
    /// no admite cambios por esta vía.
    pub async fn guardar_tabla(
        &self,
        id: u64,
        tabla: TablaGerminacion,
    ) -> Result<TablaGerminacion, SemlabError> {
        let numero = tabla.numero;
        match self.guardar_tabla_interno(id, tabla).await {
            Ok(guardada) => {
                self.notificador.exito(&format!("Tabla {} guardada", numero));
                Ok(guardada)
            }
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn guardar_tabla_interno(
        &self,
        id: u64,
        tabla: TablaGerminacion,
    ) -> Result<TablaGerminacion, SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        exigir_germinacion(&analisis)?;
        if !analisis.permite_edicion() {
            return Err(MotivoGuarda::EdicionBloqueada(analisis.estado).into());
        }
        // Crear es libre; actualizar exige que la tabla guardada siga abierta.
        let tablas = self.api.listar_tablas(id).await?;
        if tablas.iter().any(|guardada| guardada.numero == tabla.numero && guardada.finalizada) {
            return Err(MotivoValidacion::TablaFinalizada { numero: tabla.numero }.into());
        }
        self.api.guardar_tabla(id, &tabla).await
    }

    /// Cierra una tabla: los conteos quedan bloqueados y se habilita la
    /// carga de porcentajes finales.
    pub async fn finalizar_tabla(
        &self,
        id: u64,
        numero: u32,
    ) -> Result<Desenlace<TablaGerminacion>, SemlabError> {
        match self.finalizar_tabla_interno(id, numero).await {
            Ok(Desenlace::Aplicado(tabla)) => {
                self.notificador.exito(&format!("Tabla {} finalizada", numero));
                Ok(Desenlace::Aplicado(tabla))
            }
            Ok(Desenlace::Cancelado) => Ok(Desenlace::Cancelado),
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn finalizar_tabla_interno(
        &self,
        id: u64,
        numero: u32,
    ) -> Result<Desenlace<TablaGerminacion>, SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        exigir_germinacion(&analisis)?;
        if !analisis.permite_edicion() {
            return Err(MotivoGuarda::EdicionBloqueada(analisis.estado).into());
        }
        let mut tabla = self.buscar_tabla(id, numero).await?;
        if tabla.finalizada {
            return Err(MotivoValidacion::TablaFinalizada { numero }.into());
        }
        if !tabla.completa() {
            return Err(MotivoGuarda::TablaIncompleta {
                numero,
                esperadas: tabla.num_repeticiones,
                guardadas: tabla.repeticiones.len() as u32,
            }
            .into());
        }

        let solicitud = Confirmacion::nueva(
            "Finalizar tabla",
            format!("Los conteos de la tabla {} quedarán bloqueados. ¿Continuar?", numero),
            VarianteConfirmacion::Advertencia,
        );
        if !self.confirmador.confirmar(&solicitud) {
            return Ok(Desenlace::Cancelado);
        }

        tabla.finalizada = true;
        let guardada = self.api.guardar_tabla(id, &tabla).await?;
        Ok(Desenlace::Aplicado(guardada))
    }

    /// Carga los porcentajes finales de una tabla ya finalizada. Es la única
    /// escritura permitida con el análisis fuera de edición.
    pub async fn registrar_porcentajes(
        &self,
        id: u64,
        numero: u32,
        porcentajes: PorcentajesGerminacion,
    ) -> Result<TablaGerminacion, SemlabError> {
        match self.registrar_porcentajes_interno(id, numero, porcentajes).await {
            Ok(tabla) => {
                self.notificador.exito(&format!("Porcentajes de la tabla {} registrados", numero));
                Ok(tabla)
            }
            Err(error) => {
                self.notificador.error(&error.to_string());
                Err(error)
            }
        }
    }

    async fn registrar_porcentajes_interno(
        &self,
        id: u64,
        numero: u32,
        porcentajes: PorcentajesGerminacion,
    ) -> Result<TablaGerminacion, SemlabError> {
        let analisis = self.api.obtener_analisis(id).await?;
        exigir_germinacion(&analisis)?;
        let mut tabla = self.buscar_tabla(id, numero).await?;
        germinacion::aceptar_porcentajes(&tabla, &porcentajes)?;
        tabla.porcentajes = Some(porcentajes);
        self.api.guardar_tabla(id, &tabla).await
    }

    async fn buscar_tabla(&self, id: u64, numero: u32) -> Result<TablaGerminacion, SemlabError> {
        let tablas = self.api.listar_tablas(id).await?;
        tablas
            .into_iter()
            .find(|tabla| tabla.numero == numero)
            .ok_or(SemlabError::TablaNoEncontrada { analisis: id, numero })
    }

    fn notificar_guardado(&self, num_rep: u32, clasificacion: Clasificacion) {
        match clasificacion {
            Clasificacion::DebajoDelMinimo => self.notificador.advertencia(&format!(
                "Repetición {} guardada con total por debajo del mínimo",
                num_rep
            )),
            _ => self.notificador.exito(&format!("Repetición {} guardada", num_rep)),
        }
    }
}

fn exigir_germinacion(analisis: &Analisis) -> Result<(), SemlabError> {
    if analisis.tipo() != TipoAnalisis::Germinacion {
        return Err(MotivoValidacion::TipoIncompatible {
            esperado: analisis.tipo(),
            recibido: TipoAnalisis::Germinacion,
        }
        .into());
    }
    Ok(())
}

fn confirmacion_de(accion: Accion, analisis: &Analisis) -> Confirmacion {
    match accion {
        Accion::Finalizar => Confirmacion::nueva(
            "Finalizar análisis",
            format!(
                "El análisis {} del lote {} quedará pendiente de aprobación y dejará de ser editable. ¿Continuar?",
                analisis.id, analisis.lote.codigo
            ),
            VarianteConfirmacion::Advertencia,
        ),
        Accion::FinalizarYAprobar => Confirmacion::nueva(
            "Finalizar y aprobar",
            format!(
                "El análisis {} del lote {} quedará aprobado en un solo paso. ¿Continuar?",
                analisis.id, analisis.lote.codigo
            ),
            VarianteConfirmacion::Advertencia,
        ),
        Accion::Reabrir => Confirmacion::nueva(
            "Reabrir análisis",
            format!(
                "El análisis {} vuelve a edición y pierde su fecha de fin. ¿Continuar?",
                analisis.id
            ),
            VarianteConfirmacion::Advertencia,
        ),
        // Las demás acciones no piden confirmación; esto queda por si
        // alguna vez se fuerza el diálogo desde la UI.
        Accion::Aprobar | Accion::MarcarParaRepetir => Confirmacion::nueva(
            "Confirmar acción",
            format!("¿Aplicar {} sobre el análisis {}?", accion, analisis.id),
            VarianteConfirmacion::Advertencia,
        ),
    }
}

fn mensaje_exito(accion: Accion, id: u64) -> String {
    match accion {
        Accion::Finalizar => format!("Análisis {} finalizado, queda pendiente de aprobación", id),
        Accion::Aprobar => format!("Análisis {} aprobado", id),
        Accion::MarcarParaRepetir => format!("Análisis {} marcado para repetir", id),
        Accion::FinalizarYAprobar => format!("Análisis {} finalizado y aprobado", id),
        Accion::Reabrir => format!("Análisis {} reabierto para edición", id),
    }
}
