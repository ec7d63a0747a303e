use crate::api::{ApiClient, ApiClientConfig};
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::fingerprint::Fingerprinter;
use crate::infra_device::*;
use crate::infra_file::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::{Settings, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const INSTALL_MARKER: &str = ".installed";

/// Wires stores, device info, the API client and services from settings.
pub struct App {
    pub api_client: ApiClient,
    pub fingerprinter: Arc<Fingerprinter>,
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub terms_service: Arc<dyn TermsService>,
    pub session_service: Arc<dyn SessionService>,
}

struct Stores {
    secure: Arc<dyn KeyValueStore>,
    prefs: Arc<dyn KeyValueStore>,
    state_dir: Option<PathBuf>,
}

fn required_path(path: &Option<PathBuf>, name: &str) -> anyhow::Result<PathBuf> {
    path.clone()
        .ok_or_else(|| anyhow::anyhow!("storage.{} is required for the file backend", name))
}

fn build_stores(storage: &Storage) -> anyhow::Result<Stores> {
    match storage.backend.as_str() {
        "memory" => Ok(Stores {
            secure: Arc::new(MemoryStore::new()),
            prefs: Arc::new(MemoryStore::new()),
            state_dir: None,
        }),
        "file" => {
            let secure_path = required_path(&storage.secure_path, "secure_path")?;
            let prefs_path = required_path(&storage.prefs_path, "prefs_path")?;
            Ok(Stores {
                state_dir: secure_path.parent().map(Path::to_path_buf),
                secure: Arc::new(JsonFileStore::new(secure_path)),
                prefs: Arc::new(JsonFileStore::new(prefs_path)),
            })
        }
        other => Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
    }
}

impl App {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let Stores {
            secure: secure_store,
            prefs: prefs_store,
            state_dir,
        } = build_stores(&settings.storage)?;

        let device: Arc<dyn DeviceInfoProvider> = match settings.device.backend.as_str() {
            "host" => Arc::new(HostDeviceInfo::new(
                state_dir.map(|dir| dir.join(INSTALL_MARKER)),
            )),
            "static" => Arc::new(StaticDeviceInfo::new(settings.device.attributes.clone())),
            other => return Err(anyhow::anyhow!("Unknown device backend: {}", other)),
        };

        let fingerprinter = Arc::new(Fingerprinter::new(device, secure_store.clone()));

        let api_client = ApiClient::new(
            ApiClientConfig {
                base_url: settings.api.base_url.clone(),
                request_timeout: settings.api.request_timeout(),
                refresh_timeout: settings.api.refresh_timeout(),
            },
            secure_store.clone(),
            fingerprinter.clone(),
        )?;

        let session_service: Arc<dyn SessionService> =
            Arc::new(StoreSessionService::new(secure_store, prefs_store));
        let auth_service: Arc<dyn AuthService> = Arc::new(HttpAuthService::new(
            api_client.clone(),
            session_service.clone(),
        ));
        let user_service: Arc<dyn UserService> = Arc::new(HttpUserService::new(
            api_client.clone(),
            session_service.clone(),
        ));
        let terms_service: Arc<dyn TermsService> = Arc::new(HttpTermsService::new(
            settings.api.static_base_url.clone(),
            settings.api.request_timeout(),
        )?);

        info!(base_url = %api_client.base_url(), "client ready");

        Ok(Self {
            api_client,
            fingerprinter,
            auth_service,
            user_service,
            terms_service,
            session_service,
        })
    }
}
