use common::{JobKey, ProcessInstanceKey, Variables};
use criterion::{Criterion, criterion_group, criterion_main};
use engine_client::{ActivatedJob, InMemoryEngine};
use ledger::DerivedCreditLedger;
use workers::job_types;
use workers::{
    CorrelationStrategy, DiscountHandler, HandlerRegistry, InMemoryPaymentGateway, JobHandler,
    JobWorkerRuntime, RuntimeConfig,
};

fn discount_job() -> ActivatedJob {
    ActivatedJob::new(
        JobKey::new(1),
        job_types::APPLY_DISCOUNT,
        ProcessInstanceKey::new(1),
        Variables::new()
            .with("discount", 20)
            .with("orderTotal", 100.0),
    )
}

fn bench_discount_handler(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let handler = DiscountHandler::new();
    let job = discount_job();

    c.bench_function("workers/discount_execute", |b| {
        b.iter(|| rt.block_on(handler.execute(&job)));
    });
}

fn bench_credit_deduction_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let engine = InMemoryEngine::new();
    let registry = HandlerRegistry::saga_participants(
        engine.clone(),
        DerivedCreditLedger::new(),
        InMemoryPaymentGateway::new(),
        CorrelationStrategy::Empty,
    )
    .unwrap();
    let runtime = JobWorkerRuntime::new(engine, registry, RuntimeConfig::default());
    let job = ActivatedJob::new(
        JobKey::new(1),
        job_types::CREDIT_DEDUCTION,
        ProcessInstanceKey::new(1),
        Variables::new()
            .with("customerId", "customer-50")
            .with("orderTotal", 70.0),
    );

    // The engine does not know the job, so every dispatch runs the full path
    // and ends with an ignored JobNotFound answer.
    c.bench_function("workers/dispatch_credit_deduction", |b| {
        b.iter(|| rt.block_on(runtime.dispatch(job.clone())).unwrap());
    });
}

criterion_group!(benches, bench_discount_handler, bench_credit_deduction_dispatch);
criterion_main!(benches);
