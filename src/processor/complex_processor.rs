use ::std::sync::Arc;

use crate::Error;
use crate::HttpRequest;
use crate::RequestResponseProcessor;
use crate::RequestResponseProcessorFactory;
use crate::Response;

///
/// Runs a list of processors, in order, as though they were one.
///
/// Each processor receives the request (or response) returned by the one before it.
///
#[derive(Debug, Default)]
pub struct ComplexRequestResponseProcessor {
    processors: Vec<Box<dyn RequestResponseProcessor>>,
}

impl ComplexRequestResponseProcessor {
    pub fn new(processors: Vec<Box<dyn RequestResponseProcessor>>) -> Self {
        Self { processors }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl RequestResponseProcessor for ComplexRequestResponseProcessor {
    fn process_request(&mut self, request: HttpRequest) -> HttpRequest {
        self.processors
            .iter_mut()
            .fold(request, |request, processor| processor.process_request(request))
    }

    fn process_response(
        &mut self,
        request: &HttpRequest,
        response: Response,
    ) -> Result<Response, Error> {
        let mut response = response;
        for processor in self.processors.iter_mut() {
            response = processor.process_response(request, response)?;
        }

        Ok(response)
    }

    fn reset(&mut self) {
        for processor in self.processors.iter_mut() {
            processor.reset();
        }
    }
}

///
/// Builds a `ComplexRequestResponseProcessor` from other factories,
/// so each test gets new processors with no state carried over.
///
#[derive(Debug, Clone, Default)]
pub struct ComplexRequestResponseProcessorFactory {
    factories: Vec<Arc<dyn RequestResponseProcessorFactory>>,
}

impl ComplexRequestResponseProcessorFactory {
    pub fn new(factories: Vec<Arc<dyn RequestResponseProcessorFactory>>) -> Self {
        Self { factories }
    }

    /// Adds a factory to the end of the list.
    pub fn add<F>(mut self, factory: F) -> Self
    where
        F: RequestResponseProcessorFactory + 'static,
    {
        self.factories.push(Arc::new(factory));
        self
    }
}

impl RequestResponseProcessorFactory for ComplexRequestResponseProcessorFactory {
    fn create(&self) -> Box<dyn RequestResponseProcessor> {
        let processors = self
            .factories
            .iter()
            .map(|factory| factory.create())
            .collect();

        Box::new(ComplexRequestResponseProcessor::new(processors))
    }
}
