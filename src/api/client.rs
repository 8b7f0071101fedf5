use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    Response,
    StatusCode,
};
use serde::{
    de::DeserializeOwned,
    Serialize,
};

use crate::{
    analisis::{
        germinacion::{
            RepGerminacion,
            TablaGerminacion,
        },
        RepeticionGuardada,
    },
    api::types::{
        ErrorServicio,
        TransicionPeticion,
    },
    core::{
        config::ApiConfig,
        errors::SemlabError,
        models::{
            AccionRemota,
            Actor,
            Analisis,
        },
    },
};

/// Lo que el motor necesita del servicio de análisis. El servicio es el
/// único que escribe estado; de este lado solo se pide y se interpreta.
#[async_trait]
pub trait AnalisisApi: Send + Sync {
    async fn obtener_analisis(&self, id: u64) -> Result<Analisis, SemlabError>;

    async fn transicionar(
        &self,
        id: u64,
        accion: AccionRemota,
        actor: &Actor,
    ) -> Result<Analisis, SemlabError>;

    async fn listar_repeticiones(&self, id: u64) -> Result<Vec<RepeticionGuardada>, SemlabError>;

    async fn guardar_repeticion(
        &self,
        id: u64,
        rep: &RepeticionGuardada,
    ) -> Result<RepeticionGuardada, SemlabError>;

    async fn eliminar_repeticion(&self, id: u64, num_rep: u32) -> Result<(), SemlabError>;

    async fn listar_tablas(&self, id: u64) -> Result<Vec<TablaGerminacion>, SemlabError>;

    async fn guardar_tabla(
        &self,
        id: u64,
        tabla: &TablaGerminacion,
    ) -> Result<TablaGerminacion, SemlabError>;

    async fn guardar_repeticion_tabla(
        &self,
        id: u64,
        numero_tabla: u32,
        rep: &RepeticionGuardada<RepGerminacion>,
    ) -> Result<RepeticionGuardada<RepGerminacion>, SemlabError>;
}

/// Cliente HTTP contra el servicio real.
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn nueva(config: &ApiConfig) -> Result<Self, SemlabError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(HttpApi { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, camino: &str) -> String {
        format!("{}/{}", self.base_url, camino)
    }

    async fn get_json<T: DeserializeOwned>(&self, camino: &str) -> Result<T, SemlabError> {
        let respuesta = self.client.get(self.url(camino)).send().await?;
        interpretar(respuesta).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        camino: &str,
        cuerpo: &B,
    ) -> Result<T, SemlabError> {
        let respuesta = self.client.post(self.url(camino)).json(cuerpo).send().await?;
        interpretar(respuesta).await
    }
}

async fn interpretar<T: DeserializeOwned>(respuesta: Response) -> Result<T, SemlabError> {
    if respuesta.status().is_success() {
        return Ok(respuesta.json::<T>().await?);
    }
    Err(leer_rechazo(respuesta).await)
}

async fn leer_rechazo(respuesta: Response) -> SemlabError {
    let status = respuesta.status().as_u16();
    let detalle = respuesta.json::<ErrorServicio>().await.ok();
    rechazo(status, detalle)
}

fn rechazo(status: u16, detalle: Option<ErrorServicio>) -> SemlabError {
    let mensaje = detalle
        .and_then(|error| error.message)
        .unwrap_or_else(|| "el servicio no dio detalle".to_string());
    SemlabError::Rechazo { status, mensaje }
}

/// Un análisis sin tablas todavía responde 404 en el listado; para el motor
/// eso es una lista vacía, no un error.
fn interpretar_tablas(
    status: u16,
    tablas: Option<Vec<TablaGerminacion>>,
    detalle: Option<ErrorServicio>,
) -> Result<Vec<TablaGerminacion>, SemlabError> {
    if (200..300).contains(&status) {
        Ok(tablas.unwrap_or_default())
    } else if status == 404 {
        Ok(Vec::new())
    } else {
        Err(rechazo(status, detalle))
    }
}

#[async_trait]
impl AnalisisApi for HttpApi {
    async fn obtener_analisis(&self, id: u64) -> Result<Analisis, SemlabError> {
        let respuesta = self.client.get(self.url(&format!("analisis/{}", id))).send().await?;
        if respuesta.status() == StatusCode::NOT_FOUND {
            return Err(SemlabError::NoEncontrado(id));
        }
        interpretar(respuesta).await
    }

    async fn transicionar(
        &self,
        id: u64,
        accion: AccionRemota,
        actor: &Actor,
    ) -> Result<Analisis, SemlabError> {
        let peticion = TransicionPeticion::nueva(accion, actor);
        let respuesta = self
            .client
            .post(self.url(&format!("analisis/{}/transiciones", id)))
            .json(&peticion)
            .send()
            .await?;
        if respuesta.status() == StatusCode::NOT_FOUND {
            return Err(SemlabError::NoEncontrado(id));
        }
        interpretar(respuesta).await
    }

    async fn listar_repeticiones(&self, id: u64) -> Result<Vec<RepeticionGuardada>, SemlabError> {
        self.get_json(&format!("analisis/{}/repeticiones", id)).await
    }

    async fn guardar_repeticion(
        &self,
        id: u64,
        rep: &RepeticionGuardada,
    ) -> Result<RepeticionGuardada, SemlabError> {
        self.post_json(&format!("analisis/{}/repeticiones", id), rep).await
    }

    async fn eliminar_repeticion(&self, id: u64, num_rep: u32) -> Result<(), SemlabError> {
        let respuesta = self
            .client
            .delete(self.url(&format!("analisis/{}/repeticiones/{}", id, num_rep)))
            .send()
            .await?;
        if respuesta.status().is_success() {
            return Ok(());
        }
        Err(leer_rechazo(respuesta).await)
    }

    async fn listar_tablas(&self, id: u64) -> Result<Vec<TablaGerminacion>, SemlabError> {
        let respuesta =
            self.client.get(self.url(&format!("analisis/{}/tablas", id))).send().await?;
        let status = respuesta.status().as_u16();
        if respuesta.status().is_success() {
            let tablas = respuesta.json::<Vec<TablaGerminacion>>().await?;
            interpretar_tablas(status, Some(tablas), None)
        } else {
            let detalle = respuesta.json::<ErrorServicio>().await.ok();
            interpretar_tablas(status, None, detalle)
        }
    }

    async fn guardar_tabla(
        &self,
        id: u64,
        tabla: &TablaGerminacion,
    ) -> Result<TablaGerminacion, SemlabError> {
        self.post_json(&format!("analisis/{}/tablas", id), tabla).await
    }

    async fn guardar_repeticion_tabla(
        &self,
        id: u64,
        numero_tabla: u32,
        rep: &RepeticionGuardada<RepGerminacion>,
    ) -> Result<RepeticionGuardada<RepGerminacion>, SemlabError> {
        self.post_json(&format!("analisis/{}/tablas/{}/repeticiones", id, numero_tabla), rep).await
    }
}
