//! Asking the browser where the user is.

use crate::error::{Error, Result};
use crate::workout::Coords;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Position, PositionError, PositionOptions};

type Reply = Rc<RefCell<Option<oneshot::Sender<Result<Coords>>>>>;

fn send(reply: &Reply, outcome: Result<Coords>) {
    if let Some(tx) = reply.borrow_mut().take() {
        let _ = tx.send(outcome);
    }
}

/// Resolves with the current position, or `GeolocationDenied` when the
/// user refuses, the browser has no geolocation, or `timeout_ms` passes.
pub async fn current_position(timeout_ms: u32) -> Result<Coords> {
    let geolocation = gloo_utils::window()
        .navigator()
        .geolocation()
        .map_err(|_| Error::GeolocationDenied("geolocation is not supported".to_string()))?;

    let (tx, rx) = oneshot::channel();
    let reply: Reply = Rc::new(RefCell::new(Some(tx)));

    let on_success = {
        let reply = reply.clone();
        Closure::<dyn FnMut(Position)>::new(move |position: Position| {
            let coords = position.coords();
            send(&reply, Ok(Coords::new(coords.latitude(), coords.longitude())));
        })
    };
    let on_error = {
        let reply = reply.clone();
        Closure::<dyn FnMut(PositionError)>::new(move |err: PositionError| {
            send(&reply, Err(Error::GeolocationDenied(err.message())));
        })
    };

    let options = PositionOptions::new();
    options.set_timeout(timeout_ms);

    geolocation
        .get_current_position_with_error_callback_and_options(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
            &options,
        )
        .map_err(|e| Error::GeolocationDenied(format!("{:?}", e)))?;

    // Both closures stay alive until one of them has answered.
    let outcome = rx
        .await
        .unwrap_or_else(|_| Err(Error::GeolocationDenied("request dropped".to_string())));
    drop(on_success);
    drop(on_error);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_only_first_answer_is_delivered() {
        let (tx, rx) = oneshot::channel();
        let reply: Reply = Rc::new(RefCell::new(Some(tx)));

        send(&reply, Ok(Coords::new(45.0, 7.0)));
        send(&reply, Err(Error::GeolocationDenied("late timeout".into())));

        let outcome = block_on(rx).unwrap();
        assert_eq!(outcome.unwrap(), Coords::new(45.0, 7.0));
        assert!(reply.borrow().is_none());
    }
}
