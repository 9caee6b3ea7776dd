use tracing::{debug, trace};

use crate::{
    binder,
    classify::{QueryOrigin, classify},
    config::EngineConfig,
    descriptor::{DescriptorCache, MetadataResolver, MethodDescriptor},
    error::{BindingError, QueryContext, Result},
    port::{CrudRequest, ExecutionPort},
    shape::{Shaped, shape},
    translate::{self, Params},
    value::Value,
};

/// Routes one invocation to the port and shapes what comes back. Holds no
///  per-call state, so one dispatcher serves any number of concurrent calls
///  when its port allows it.
pub struct Dispatcher<P> {
    port: P,
    config: EngineConfig,
}

impl<P> Dispatcher<P>
where
    P: ExecutionPort,
    P::Item: PartialEq + 'static,
{
    pub fn new(port: P, config: EngineConfig) -> Self {
        Self { port, config }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classifies every descriptor up front so a bad declaration fails at
    ///  startup rather than on first call.
    pub fn validate<'d>(
        &self,
        descriptors: impl IntoIterator<Item = &'d MethodDescriptor>,
    ) -> Result<()> {
        for descriptor in descriptors {
            descriptor.validate_bindings()?;
            classify(descriptor)?;
        }
        Ok(())
    }

    pub fn invoke(
        &self,
        descriptor: &MethodDescriptor,
        args: &[Value],
    ) -> Result<Shaped<P::Item>> {
        let origin = classify(descriptor)?;
        let dialect = self.config.dialect;
        debug!(method = %descriptor.name, %dialect, origin = origin.kind(), "dispatching");

        match origin {
            QueryOrigin::BuiltinCrud(op) => {
                if args.len() != op.arity() {
                    return Err(BindingError::ArgumentCount {
                        expected: op.arity(),
                        actual: args.len(),
                    }
                    .into());
                }
                let context = QueryContext::new(dialect, &op.to_string(), false);
                let raw = self
                    .port
                    .execute_crud(CrudRequest {
                        op,
                        argument: args.first(),
                    })
                    .map_err(|e| context.wrap(e))?;
                shape(descriptor.returns, raw, context)
            }
            QueryOrigin::LiteralQuery(query) => {
                let bindings = binder::bind(descriptor, args)?;
                let params = if dialect.is_positional() {
                    Params::Positional(args.to_vec())
                } else {
                    bindings.into_params()
                };
                let context = QueryContext::new(dialect, &query, self.config.redact_literals);
                let raw = self
                    .port
                    .execute_literal(dialect, &query, &params)
                    .map_err(|e| context.wrap(e))?;
                shape(descriptor.returns, raw, context)
            }
            QueryOrigin::DerivedQuery(plan) => {
                let condition = plan.instantiate(args)?;
                let filter = translate::translate(dialect, &condition, &descriptor.projection)?;
                trace!(method = %descriptor.name, filter = filter.query_text(), "translated");

                let context =
                    QueryContext::new(dialect, filter.query_text(), self.config.redact_literals);
                let raw = self
                    .port
                    .execute_filter(dialect, &filter)
                    .map_err(|e| context.wrap(e))?;
                shape(descriptor.returns, raw, context)
            }
        }
    }
}

/// A set of resolved methods bound to one store.
pub struct Repository<P> {
    descriptors: DescriptorCache,
    dispatcher: Dispatcher<P>,
}

impl<P> Repository<P>
where
    P: ExecutionPort,
    P::Item: PartialEq + 'static,
{
    pub fn new(port: P, config: EngineConfig, descriptors: DescriptorCache) -> Result<Self> {
        let dispatcher = Dispatcher::new(port, config);
        if config.eager_validation {
            dispatcher.validate(descriptors.iter())?;
        }
        Ok(Self {
            descriptors,
            dispatcher,
        })
    }

    /// Resolves `methods` once and builds the repository over them.
    pub fn build<'m, R>(
        port: P,
        config: EngineConfig,
        resolver: &R,
        methods: impl IntoIterator<Item = &'m R::Method>,
    ) -> Result<Self>
    where
        R: MetadataResolver,
        R::Method: 'm,
    {
        Self::new(port, config, DescriptorCache::build(resolver, methods)?)
    }

    pub fn descriptors(&self) -> &DescriptorCache {
        &self.descriptors
    }

    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.dispatcher
    }

    pub fn call(&self, method: &str, args: &[Value]) -> Result<Shaped<P::Item>> {
        let descriptor = self.descriptors.get(method)?;
        self.dispatcher.invoke(&descriptor, args)
    }
}
