//! Server-side view of the operation set.
//!
//! [`TableService`] is the typed surface a storage backend implements;
//! [`Handler`] is the value-level surface a server loop drives. Every
//! `TableService` is a `Handler` through [`dispatch`].

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::operation::OperationDescriptor;
use crate::protocol::Outcome;
use crate::value::{Marshal, Returns, Value};

/// Executes one call given as an operation name and marshaled arguments
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, operation: &str, args: Vec<Value>) -> Outcome;
}

fn take<T: Marshal>(args: &mut impl Iterator<Item = Value>) -> Result<T, RemoteError> {
    let value = args
        .next()
        .ok_or_else(|| RemoteError::application("missing argument"))?;
    T::from_value(value).map_err(|other| {
        RemoteError::application(format!(
            "expected {} argument, got {}",
            T::KIND,
            other.kind()
        ))
    })
}

macro_rules! define_service {
    ($($(#[$meta:meta])* fn $fn:ident = $name:literal ($($arg:ident : $ty:ty),*) -> $ret:ty;)*) => {
        /// Typed operation surface of the storage service
        ///
        /// Every method defaults to [`RemoteError::Unimplemented`], so a
        /// backend only overrides the operations it serves.
        #[async_trait]
        pub trait TableService: Send + Sync {
            $(
                $(#[$meta])*
                async fn $fn(&self, $($arg: $ty),*) -> Result<$ret, RemoteError> {
                    let _ = ($($arg,)*);
                    Err(RemoteError::Unimplemented($name.to_string()))
                }
            )*
        }

        /// Decode `args`, run the named operation on `service` and marshal its result
        ///
        /// Unknown names and arguments that do not match the operation's
        /// declared parameters are reported as [`RemoteError::Application`].
        pub async fn dispatch<S>(service: &S, operation: &str, args: Vec<Value>) -> Outcome
        where
            S: TableService + ?Sized,
        {
            let descriptor = OperationDescriptor::lookup(operation).ok_or_else(|| {
                RemoteError::application(format!("unknown operation `{}`", operation))
            })?;
            descriptor.check_args(&args).map_err(|e| {
                RemoteError::application(format!("bad arguments for `{}`: {}", operation, e))
            })?;

            let mut args = args.into_iter();
            match operation {
                $(
                    $name => {
                        $(let $arg: $ty = take(&mut args)?;)*
                        service.$fn($($arg),*).await.map(Returns::into_values)
                    }
                )*
                _ => Err(RemoteError::application(format!("unknown operation `{}`", operation))),
            }
        }
    };
}

crate::for_each_operation!(define_service);

#[async_trait]
impl<S: TableService> Handler for S {
    async fn handle(&self, operation: &str, args: Vec<Value>) -> Outcome {
        dispatch(self, operation, args).await
    }
}
