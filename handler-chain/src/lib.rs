//! # Handler chain
//!
//! Runs a sequence of handlers for each inbound request. All `before` run in order (any false stops
//! the chain); then `handle` runs until one returns Stop; then all `after` run in reverse, also when
//! a handler's `handle` failed, so observers see every request that entered the handle phase.

use relay_core::{Handler, HandlerResponse, InboundRequest, Result};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Chain of handlers: before (all) → handle (until Stop) → after (reverse).
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs all before → handle until Stop → all after in reverse. A handle error is returned after
    /// the after phase has run with `Stop`.
    #[instrument(skip(self, request), fields(user_id = request.user.id, chat_id = request.chat.id))]
    pub async fn handle(&self, request: &InboundRequest) -> Result<HandlerResponse> {
        debug!(message_id = %request.id, "step: handler_chain started");

        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            let should_continue = h.before(request).await?;
            if !should_continue {
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        let mut handle_error = None;

        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            match h.handle(request).await {
                Ok(HandlerResponse::Stop) => {
                    debug!(handler = %name, "step: handler chain stopped by handler");
                    final_response = HandlerResponse::Stop;
                    break;
                }
                Ok(response) => {
                    debug!(handler = %name, response = ?response, "Handler processed");
                }
                Err(e) => {
                    error!(handler = %name, error = %e, "step: handler failed");
                    final_response = HandlerResponse::Stop;
                    handle_error = Some(e);
                    break;
                }
            }
        }

        for h in self.handlers.iter().rev() {
            h.after(request, &final_response).await?;
        }

        debug!(message_id = %request.id, response = ?final_response, "step: handler_chain finished");

        match handle_error {
            Some(e) => Err(e),
            None => Ok(final_response),
        }
    }
}

// Tests live in tests/handler_chain_test.rs
