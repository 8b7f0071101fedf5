use std::{
    env,
    fs,
    io::{
        self,
        BufRead,
        Write,
    },
    process,
    sync::Arc,
};

use semlab::{
    analisis::{
        estadisticas,
        validacion,
        Clasificacion,
        Repeticion,
    },
    api::{
        AnalisisApi,
        HttpApi,
    },
    core::models::{
        Accion,
        Actor,
        ConfigAnalisis,
        Rol,
        TipoAnalisis,
    },
    workflow::{
        Confirmacion,
        Confirmador,
        Desenlace,
        Notificador,
        Orquestador,
    },
    ApiConfig,
    SemlabError,
};
use serde::Deserialize;

/// Confirmación por consola: imprime la pregunta y lee una línea.
struct ConsolaConfirmador;

impl Confirmador for ConsolaConfirmador {
    fn confirmar(&self, solicitud: &Confirmacion) -> bool {
        println!("\n{}", solicitud.titulo);
        println!("{}", solicitud.mensaje);
        print!("[s/N] > ");
        let _ = io::stdout().flush();

        let mut linea = String::new();
        if io::stdin().lock().read_line(&mut linea).is_err() {
            return false;
        }
        matches!(linea.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes")
    }
}

struct ConsolaNotificador;

impl Notificador for ConsolaNotificador {
    fn exito(&self, mensaje: &str) {
        println!("[ok] {}", mensaje);
    }

    fn advertencia(&self, mensaje: &str) {
        println!("[atención] {}", mensaje);
    }

    fn error(&self, mensaje: &str) {
        eprintln!("[error] {}", mensaje);
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let resultado = match (args.get(1).map(String::as_str), args.get(2), args.get(3)) {
        (Some("estado"), Some(id), None) => comando_estado(id).await,
        (Some("validar"), Some(ruta), None) => comando_validar(ruta),
        (Some("accion"), Some(id), Some(accion)) => comando_accion(id, accion).await,
        _ => {
            imprimir_uso();
            process::exit(2);
        }
    };

    if let Err(error) = resultado {
        eprintln!("[error] {}", error);
        process::exit(1);
    }
}

async fn comando_estado(id: &str) -> Result<(), SemlabError> {
    let id = parsear_id(id)?;
    let api = Arc::new(HttpApi::nueva(&ApiConfig::cargar())?);
    let orquestador = orquestador_consola(api.clone());

    let analisis = api.obtener_analisis(id).await?;
    println!(
        "Análisis {} · {} · lote {}",
        analisis.id,
        analisis.tipo(),
        analisis.lote.descripcion()
    );
    if let Some(partes) = analisis.lote.componentes() {
        println!("Campaña: {}", partes.campania);
    }
    println!("Estado: {}", analisis.estado.etiqueta_usuario());
    if let Some(comentarios) = &analisis.comentarios {
        println!("Comentarios: {}", comentarios);
    }

    let datos = orquestador.cargar_datos(id).await?;
    if analisis.tipo() == TipoAnalisis::Germinacion {
        for tabla in &datos.tablas {
            let estado_tabla = if tabla.finalizada { "finalizada" } else { "abierta" };
            println!("\nTabla {} ({})", tabla.numero, estado_tabla);
            println!("{}", serde_json::to_string_pretty(&tabla.estadisticas())?);
            println!("Porcentajes crudos: {}", serde_json::to_string(&tabla.porcentajes_crudos())?);
        }
    } else {
        let reps: Vec<Repeticion> = datos.repeticiones.iter().map(|rep| rep.datos.clone()).collect();
        let stats = estadisticas::agregar(analisis.tipo(), &reps)?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

async fn comando_accion(id: &str, accion: &str) -> Result<(), SemlabError> {
    let id = parsear_id(id)?;
    let accion = parsear_accion(accion)
        .ok_or_else(|| SemlabError::Custom(format!("acción desconocida: {}", accion)))?;

    let api = Arc::new(HttpApi::nueva(&ApiConfig::cargar())?);
    let orquestador = orquestador_consola(api);
    let actor = actor_desde_entorno();

    // Los errores de ejecutar ya salieron por el notificador.
    match orquestador.ejecutar(id, accion, &actor).await {
        Ok(Desenlace::Aplicado(analisis)) => {
            println!("Estado actual: {}", analisis.estado.etiqueta_usuario());
            Ok(())
        }
        Ok(Desenlace::Cancelado) => {
            println!("Sin cambios.");
            Ok(())
        }
        Err(_) => process::exit(1),
    }
}

/// Borrador para validar en la mesada, sin tocar el servicio. El archivo
/// trae la configuración del análisis y la repetición, las dos con `tipo`.
#[derive(Deserialize)]
struct Borrador {
    config: ConfigAnalisis,
    repeticion: Repeticion,
}

fn comando_validar(ruta: &str) -> Result<(), SemlabError> {
    let contenido = fs::read_to_string(ruta)?;
    let borrador: Borrador = serde_json::from_str(&contenido)?;

    match validacion::validar_repeticion(&borrador.repeticion, &borrador.config)? {
        Clasificacion::EnRango => {
            println!("[ok] El borrador cae dentro de la banda de tolerancia.");
        }
        Clasificacion::DebajoDelMinimo => {
            println!("[atención] El total queda por debajo del mínimo; se guarda con advertencia.");
        }
        Clasificacion::ExcedeMaximo => {
            eprintln!("[error] El total excede la banda de tolerancia; no se puede guardar.");
            process::exit(1);
        }
    }
    Ok(())
}

fn orquestador_consola(api: Arc<HttpApi>) -> Orquestador {
    Orquestador::new(api, Arc::new(ConsolaConfirmador), Arc::new(ConsolaNotificador))
}

fn actor_desde_entorno() -> Actor {
    let nombre = env::var("SEMLAB_USUARIO").unwrap_or_else(|_| "consola".to_string());
    let rol = match env::var("SEMLAB_ROL").as_deref() {
        Ok("supervisor") => Rol::Supervisor,
        Ok("administrador") | Ok("admin") => Rol::Administrador,
        _ => Rol::Analista,
    };
    Actor::new(nombre, rol)
}

fn parsear_id(texto: &str) -> Result<u64, SemlabError> {
    texto.parse().map_err(|_| SemlabError::Custom(format!("id inválido: {}", texto)))
}

fn parsear_accion(texto: &str) -> Option<Accion> {
    match texto {
        "finalizar" => Some(Accion::Finalizar),
        "aprobar" => Some(Accion::Aprobar),
        "repetir" => Some(Accion::MarcarParaRepetir),
        "finalizar-aprobar" => Some(Accion::FinalizarYAprobar),
        "reabrir" => Some(Accion::Reabrir),
        _ => None,
    }
}

fn imprimir_uso() {
    eprintln!("Uso:");
    eprintln!("  semlab estado <id>             estado y estadísticos de un análisis");
    eprintln!("  semlab validar <archivo.json>  clasifica un borrador de repetición sin conexión");
    eprintln!("  semlab accion <id> <accion>    aplica una acción de workflow");
    eprintln!();
    eprintln!("Acciones: finalizar, aprobar, repetir, finalizar-aprobar, reabrir");
    eprintln!("Entorno:  SEMLAB_USUARIO, SEMLAB_ROL (analista|supervisor|administrador),");
    eprintln!("          SEMLAB_API_URL, SEMLAB_TIMEOUT_SECS");
}
