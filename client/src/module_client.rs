use std::{
    io::{BufReader, Read, Write},
    net::{TcpStream, ToSocketAddrs},
};

use modbox_shared::{handshake, ArgValue, MarshalError, Marshaler, Signature, EXIT_COMMAND};

use crate::{client_config::ClientConfig, error::ClientError};

pub type TcpModuleClient = ModuleClient<BufReader<TcpStream>, TcpStream>;

/// One module's connection to the engine.
///
/// Calls are strictly sequential: each call writes the command and its
/// arguments, then blocks until all results arrived.
pub struct ModuleClient<R, W> {
    reader: R,
    writer: W,
    marshaler: Marshaler,
    module_name: String,
    open: bool,
}

impl TcpModuleClient {
    /// Connects to the engine at `addr` and runs the handshake
    pub fn connect<A: ToSocketAddrs>(addr: A, config: ClientConfig) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).map_err(|error| ClientError::Connect {
            kind: error.kind(),
        })?;
        stream.set_nodelay(true).map_err(|error| ClientError::Connect {
            kind: error.kind(),
        })?;
        let writer = stream.try_clone().map_err(|error| ClientError::Connect {
            kind: error.kind(),
        })?;

        let mut client = ModuleClient::new(BufReader::new(stream), writer, config);
        client.handshake()?;
        Ok(client)
    }
}

impl<R: Read, W: Write> ModuleClient<R, W> {
    /// Wraps an already connected stream pair. Call `handshake` before
    /// anything else.
    pub fn new(reader: R, writer: W, config: ClientConfig) -> Self {
        Self {
            reader,
            writer,
            marshaler: Marshaler::new(&config.marshal),
            module_name: config.module_name,
            open: true,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Waits for the engine's header, then answers with ours and the
    /// module name
    pub fn handshake(&mut self) -> Result<(), ClientError> {
        let result = handshake::read_server_header(&mut self.reader).and_then(|_| {
            handshake::write_module_hello(&self.marshaler, &mut self.writer, &self.module_name)
        });
        if result.is_err() {
            self.open = false;
        }
        result?;
        log::debug!("Module '{}' connected to the engine", self.module_name);
        Ok(())
    }

    /// Calls `command` and decodes its results per `ret_signature`.
    ///
    /// Argument values are encoded in their own types; they must match the
    /// engine's registered signature or the engine closes the connection.
    pub fn call(
        &mut self,
        command: &str,
        args: &[ArgValue],
        ret_signature: &Signature,
    ) -> Result<Vec<ArgValue>, ClientError> {
        if !self.open {
            return Err(ClientError::Closed);
        }
        let result = self.exchange(command, args, ret_signature);
        if result.is_err() {
            self.open = false;
        }
        result.map_err(|source| ClientError::Call {
            command: command.to_string(),
            source,
        })
    }

    fn exchange(
        &mut self,
        command: &str,
        args: &[ArgValue],
        ret_signature: &Signature,
    ) -> Result<Vec<ArgValue>, MarshalError> {
        // one write per call, so the engine never sees half a frame
        let mut frame = Vec::new();
        self.marshaler.write_string(&mut frame, command)?;
        for arg in args {
            self.marshaler.encode(arg, &mut frame)?;
        }
        self.writer.write_all(&frame)?;
        self.writer.flush()?;

        self.marshaler.decode_all(ret_signature, &mut self.reader)
    }

    /// Ends the session gracefully. The engine sends nothing back.
    pub fn exit(&mut self) -> Result<(), ClientError> {
        if !self.open {
            return Err(ClientError::Closed);
        }
        self.open = false;
        self.send_exit().map_err(|source| ClientError::Call {
            command: EXIT_COMMAND.to_string(),
            source,
        })?;
        log::debug!("Module '{}' exited", self.module_name);
        Ok(())
    }

    fn send_exit(&mut self) -> Result<(), MarshalError> {
        let mut frame = Vec::new();
        self.marshaler.write_string(&mut frame, EXIT_COMMAND)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
