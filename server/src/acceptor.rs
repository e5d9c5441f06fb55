use std::{
    io::{self, BufReader, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use modbox_shared::{FunctionRegistry, Marshaler};

use crate::{
    server_config::ServerConfig,
    session::{ModuleSession, SessionOutcome},
    worker::ModuleWorker,
};

/// Stops a running ModuleServer's accept loop
#[derive(Clone)]
pub struct ServerHandle {
    stop: Arc<AtomicBool>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new modules. Sessions already running are not
    /// interrupted.
    pub fn stop(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        // accept() only returns on a connection, so make one
        if let Err(error) = TcpStream::connect(self.local_addr) {
            log::debug!("Could not wake the module acceptor: {}", error);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Accepts module connections and spawns one worker thread per connection
pub struct ModuleServer {
    config: ServerConfig,
    registry: Arc<FunctionRegistry>,
    marshaler: Marshaler,
    listener: Option<TcpListener>,
    stop: Arc<AtomicBool>,
    worker_count: AtomicU64,
}

impl ModuleServer {
    /// Creates a server over `registry`, locking it against any further
    /// registration
    pub fn new(config: ServerConfig, registry: FunctionRegistry) -> Self {
        Self::with_shared_registry(config, registry.into_shared())
    }

    pub fn with_shared_registry(config: ServerConfig, registry: Arc<FunctionRegistry>) -> Self {
        let marshaler = Marshaler::new(&config.marshal);
        Self {
            config,
            registry,
            marshaler,
            listener: None,
            stop: Arc::new(AtomicBool::new(false)),
            worker_count: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Binds the listening socket. Returns the bound address, which differs
    /// from the configured one when port 0 was requested.
    pub fn listen(&mut self) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.listen_addr)?;
        let local_addr = listener.local_addr()?;
        log::info!(
            "Listening for modules on {} ({} functions registered)",
            local_addr,
            self.registry.len()
        );
        self.listener = Some(listener);
        Ok(local_addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    pub fn handle(&self) -> io::Result<ServerHandle> {
        let local_addr = self
            .local_addr()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "server is not listening"))?;
        Ok(ServerHandle {
            stop: self.stop.clone(),
            local_addr,
        })
    }

    /// Accepts connections until stopped. Binds first if `listen` was not
    /// called.
    pub fn serve(&mut self) -> io::Result<()> {
        if self.listener.is_none() {
            self.listen()?;
        }
        let Some(listener) = self.listener.take() else {
            return Ok(());
        };

        for incoming in listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            match incoming {
                Ok(stream) => {
                    if let Err(error) = self.accept_stream(stream) {
                        log::warn!("Failed to start a module worker: {}", error);
                    }
                }
                Err(error) => log::warn!("Failed to accept a module connection: {}", error),
            }
        }

        log::info!("Module acceptor stopped");
        Ok(())
    }

    /// Binds and runs the accept loop on its own thread
    pub fn spawn(mut self) -> io::Result<(ServerHandle, JoinHandle<()>)> {
        if self.listener.is_none() {
            self.listen()?;
        }
        let handle = self.handle()?;
        let thread = thread::Builder::new()
            .name("module-acceptor".to_string())
            .spawn(move || {
                if let Err(error) = self.serve() {
                    log::error!("Module acceptor failed: {}", error);
                }
            })?;
        Ok((handle, thread))
    }

    /// Configures an accepted TCP connection and hands it to a new worker
    pub fn accept_stream(&self, stream: TcpStream) -> io::Result<JoinHandle<SessionOutcome>> {
        stream.set_nodelay(self.config.nodelay)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        let label = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown peer".to_string());
        let writer = stream.try_clone()?;
        self.spawn_worker(BufReader::new(stream), writer, label)
    }

    /// Runs a worker over any pair of byte streams on a new thread
    pub fn spawn_worker<R, W>(
        &self,
        reader: R,
        writer: W,
        label: impl Into<String>,
    ) -> io::Result<JoinHandle<SessionOutcome>>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let label = label.into();
        let index = self.worker_count.fetch_add(1, Ordering::Relaxed);
        log::debug!("Spawning module worker {} for {}", index, label);

        let worker = ModuleWorker::new(
            ModuleSession::new(reader, writer, label),
            self.registry.clone(),
            self.marshaler.clone(),
        );
        thread::Builder::new()
            .name(format!("module-worker-{}", index))
            .spawn(move || worker.run())
    }

    /// Number of workers spawned so far
    pub fn workers_spawned(&self) -> u64 {
        self.worker_count.load(Ordering::Relaxed)
    }
}
