use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError, Weak};

use vc_json_reflect::Reflect;

use crate::codec::{Codec, CodecRef};
use crate::{Decoder, Error, Session, UnmarshalSession};

enum State {
    Pending,
    Resolved,
    Failed(String),
}

/// A placeholder installed in the cache while the codec of a type is built.
///
/// Codecs built meanwhile for the same type, e.g. the fields of a recursive
/// struct, hold this placeholder instead of building again. It settles exactly
/// once: callers invoking it before that block until it does.
///
/// The resolved codec is held weakly, the cache owns it.
pub(crate) struct DeferredCodec {
    type_path: &'static str,
    resolved: OnceLock<Weak<dyn Codec>>,
    state: Mutex<State>,
    settled: Condvar,
}

impl DeferredCodec {
    pub fn new(type_path: &'static str) -> Self {
        Self {
            type_path,
            resolved: OnceLock::new(),
            state: Mutex::new(State::Pending),
            settled: Condvar::new(),
        }
    }

    /// Settles the placeholder with the built codec, waking every waiter.
    pub fn resolve(&self, codec: &CodecRef) {
        self.settle(State::Resolved, || {
            let _ = self.resolved.set(Arc::downgrade(codec));
        });
    }

    /// Settles the placeholder with a failure, waking every waiter.
    pub fn fail(&self, reason: impl ToString) {
        self.settle(State::Failed(reason.to_string()), || {});
    }

    // Only the first settlement counts.
    fn settle(&self, next: State, publish: impl FnOnce()) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, State::Pending) {
            publish();
            *state = next;
        }
        drop(state);
        self.settled.notify_all();
    }

    fn target(&self) -> Result<CodecRef, Error> {
        if let Some(weak) = self.resolved.get() {
            return self.upgrade(weak);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match &*state {
                State::Pending => {
                    state = self
                        .settled
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                State::Failed(reason) => {
                    return Err(Error::construction(self.type_path, reason));
                }
                State::Resolved => break,
            }
        }
        drop(state);

        match self.resolved.get() {
            Some(weak) => self.upgrade(weak),
            None => Err(Error::construction(self.type_path, "codec was never resolved")),
        }
    }

    fn upgrade(&self, weak: &Weak<dyn Codec>) -> Result<CodecRef, Error> {
        weak.upgrade()
            .ok_or_else(|| Error::construction(self.type_path, "codec was released by a reset"))
    }
}

impl Codec for DeferredCodec {
    fn encode(&self, value: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
        self.target()?.encode(value, session)
    }

    fn decode(
        &self,
        value: &mut dyn Reflect,
        decoder: &mut Decoder<'_>,
        session: &mut UnmarshalSession<'_>,
    ) -> Result<(), Error> {
        self.target()?.decode(value, decoder, session)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use vc_json_reflect::Reflect;

    use super::DeferredCodec;
    use crate::cache::Cache;
    use crate::codec::{Codec, CodecRef};
    use crate::{Decoder, Error, IOConfig, Options, Session, UnmarshalSession};

    struct Literal;

    impl Codec for Literal {
        fn encode(&self, _: &dyn Reflect, session: &mut Session<'_>) -> Result<(), Error> {
            session.buffer().extend_from_slice(b"42");
            Ok(())
        }

        fn decode(
            &self,
            _: &mut dyn Reflect,
            _: &mut Decoder<'_>,
            _: &mut UnmarshalSession<'_>,
        ) -> Result<(), Error> {
            Ok(())
        }
    }

    fn encode(codec: &dyn Codec) -> Result<Vec<u8>, Error> {
        let cache = Cache::new(IOConfig::new());
        let options = Options::new();
        let mut buf = Vec::new();
        let mut session = Session::new(&mut buf, &cache, &options);
        codec.encode(&0_i32, &mut session)?;
        Ok(buf)
    }

    #[test]
    fn waiters_released_on_resolve() {
        let deferred = Arc::new(DeferredCodec::new("i32"));
        let codec: CodecRef = Arc::new(Literal);

        let waiters = (0..4)
            .map(|_| {
                let deferred = deferred.clone();
                thread::spawn(move || encode(&*deferred).unwrap())
            })
            .collect::<Vec<_>>();

        deferred.resolve(&codec);
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), b"42");
        }
        assert_eq!(encode(&*deferred).unwrap(), b"42");
    }

    #[test]
    fn failure_is_reported_to_every_holder() {
        let deferred = DeferredCodec::new("i32");
        deferred.fail("unsupported");
        // A later resolution is ignored.
        deferred.resolve(&(Arc::new(Literal) as CodecRef));

        for _ in 0..2 {
            let err = encode(&deferred).unwrap_err();
            assert!(matches!(err, Error::Construction { type_path: "i32", .. }));
        }
    }

    #[test]
    fn released_codec() {
        let deferred = DeferredCodec::new("i32");
        deferred.resolve(&(Arc::new(Literal) as CodecRef));
        assert!(encode(&deferred).is_err());
    }
}
