use async_trait::async_trait;

/// A synchronous pipeline task. Cheap, non-blocking work only,
/// e.g. validation or payload assembly
pub trait BlockingTask<C, E>: Send + Sync {
    fn run(&self, context: &C) -> Result<(), E>;
}

/// An asynchronous pipeline task, for work with await points
/// such as outbound http calls
#[async_trait]
pub trait AsyncTask<C, E>: Send + Sync {
    async fn run(&self, context: &C) -> Result<(), E>;
}

enum Task<C, E> {
    Blocking(Box<dyn BlockingTask<C, E>>),
    Async(Box<dyn AsyncTask<C, E>>),
}

/// An ordered chain of tasks sharing one context. Tasks run
/// sequentially and the first error aborts the remainder of
/// the chain, surfacing that error to the caller
pub struct Pipeline<C: Send + Sync, E> {
    tasks: Vec<Task<C, E>>,
}

impl<C: Send + Sync, E> Pipeline<C, E> {
    /// Run every task in order against the shared context,
    /// returning the first task error if any
    pub async fn run(&self, context: &C) -> Result<(), E> {
        for task in &self.tasks {
            match task {
                Task::Blocking(t) => t.run(context)?,
                Task::Async(t) => t.run(context).await?,
            }
        }

        Ok(())
    }
}

pub struct PipelineBuilder<C: Send + Sync, E> {
    tasks: Vec<Task<C, E>>,
}

impl<C: Send + Sync, E> PipelineBuilder<C, E> {
    pub fn new() -> Self {
        PipelineBuilder { tasks: Vec::new() }
    }

    pub fn with_blocking(mut self, task: Box<dyn BlockingTask<C, E>>) -> Self {
        self.tasks.push(Task::Blocking(task));
        self
    }

    pub fn with_async(mut self, task: Box<dyn AsyncTask<C, E>>) -> Self {
        self.tasks.push(Task::Async(task));
        self
    }

    pub fn add_blocking(&mut self, task: Box<dyn BlockingTask<C, E>>) {
        self.tasks.push(Task::Blocking(task));
    }

    pub fn add_async(&mut self, task: Box<dyn AsyncTask<C, E>>) {
        self.tasks.push(Task::Async(task));
    }

    /// Returns None if no tasks were added, as an empty
    /// pipeline is almost certainly a wiring mistake
    pub fn build(self) -> Option<Pipeline<C, E>> {
        if self.tasks.is_empty() {
            return None;
        }

        Some(Pipeline { tasks: self.tasks })
    }
}

impl<C: Send + Sync, E> Default for PipelineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Error, anyhow};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        hits: AtomicUsize,
    }

    struct BumpTask;

    impl BlockingTask<Counter, Error> for BumpTask {
        fn run(&self, ctx: &Counter) -> Result<(), Error> {
            ctx.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BumpAsyncTask;

    #[async_trait]
    impl AsyncTask<Counter, Error> for BumpAsyncTask {
        async fn run(&self, ctx: &Counter) -> Result<(), Error> {
            ctx.hits.fetch_add(10, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailTask;

    impl BlockingTask<Counter, Error> for FailTask {
        fn run(&self, _ctx: &Counter) -> Result<(), Error> {
            Err(anyhow!("boom"))
        }
    }

    #[test]
    fn empty_builder_yields_none() {
        let pipeline: Option<Pipeline<Counter, Error>> = PipelineBuilder::new().build();
        assert!(pipeline.is_none());
    }

    #[actix_web::test]
    async fn runs_tasks_in_order() {
        let pipeline = PipelineBuilder::new()
            .with_blocking(Box::new(BumpTask))
            .with_async(Box::new(BumpAsyncTask))
            .build()
            .unwrap();

        let ctx = Counter {
            hits: AtomicUsize::new(0),
        };

        pipeline.run(&ctx).await.unwrap();
        assert_eq!(ctx.hits.load(Ordering::SeqCst), 11);
    }

    #[actix_web::test]
    async fn error_aborts_remaining_tasks() {
        let pipeline = PipelineBuilder::new()
            .with_blocking(Box::new(BumpTask))
            .with_blocking(Box::new(FailTask))
            .with_async(Box::new(BumpAsyncTask))
            .build()
            .unwrap();

        let ctx = Counter {
            hits: AtomicUsize::new(0),
        };

        let res = pipeline.run(&ctx).await;
        assert!(res.is_err());
        assert_eq!(ctx.hits.load(Ordering::SeqCst), 1);
    }
}
