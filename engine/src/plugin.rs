use anyhow::{anyhow, Result};
use colorcube_engine_interface::{
    plugin::{Constructor, Context, PluginDispatch, UserState},
    serial::{ReceiveBuf, SendBuf},
};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Type-erased plugin context, so that the engine may host any number of plugin state types
trait HostedPlugin {
    fn dispatch(&mut self, recv: ReceiveBuf) -> SendBuf;
    fn as_any(&self) -> &dyn Any;
}

impl<U: 'static> HostedPlugin for Context<U> {
    fn dispatch(&mut self, recv: ReceiveBuf) -> SendBuf {
        PluginDispatch::dispatch(self, recv)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A plugin compiled into the host
pub struct Plugin {
    name: String,
    code: Box<dyn HostedPlugin>,
}

impl Plugin {
    /// Load the plugin in an uninitialized state
    pub fn native<U: UserState>(name: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            code: Box::new(Context::<U>::new(seed)),
        }
    }

    /// Load a plugin whose state is built by the given constructor
    pub fn with_constructor<U: 'static>(name: &str, seed: u64, init: Constructor<U>) -> Self {
        Self {
            name: name.to_string(),
            code: Box::new(Context::with_constructor(seed, init)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch plugin internals with given intent. A panicking plugin is reported as an error.
    pub fn dispatch(&mut self, recv: ReceiveBuf) -> Result<SendBuf> {
        let code = &mut self.code;
        catch_unwind(AssertUnwindSafe(|| code.dispatch(recv)))
            .map_err(|_| anyhow!("Plugin {} panicked during dispatch", self.name))
    }

    /// Plugin state, if this plugin holds a `U` and has been initialized
    pub fn state<U: 'static>(&self) -> Option<&U> {
        self.code.as_any().downcast_ref::<Context<U>>()?.user()
    }
}
