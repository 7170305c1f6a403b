//! Actor System Benchmarks
//!
//! Measures baseline performance of actor lifecycle operations:
//! - Single actor spawn latency
//! - Batch actor spawn (10 actors)
//! - Fire-and-forget message throughput

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::convert::Infallible;
use std::hint::black_box;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};

// Layer 3: Internal module imports
use nexusrt::{Actor, ActorContext, Props, SystemConfig};

#[derive(Debug)]
struct Ping;

struct EchoActor;

impl std::fmt::Debug for EchoActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EchoActor").finish()
    }
}

#[async_trait]
impl Actor for EchoActor {
    type Message = Ping;
    type Error = Infallible;

    async fn receive(&mut self, _message: Ping, _ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        Ok(())
    }
}

fn bench_single_spawn(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("actor_spawn_single", |b| {
        b.iter(|| {
            rt.block_on(async {
                let system = nexusrt::ActorSystem::new(SystemConfig::default());
                let pid = system.spawn(Props::from_producer(|| EchoActor));
                black_box(pid);
            })
        });
    });
}

fn bench_batch_spawn(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("actor_spawn_batch_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let system = nexusrt::ActorSystem::new(SystemConfig::default());
                for _ in 0..10 {
                    black_box(system.spawn(Props::from_producer(|| EchoActor)));
                }
            })
        });
    });
}

fn bench_message_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("actor_message_throughput_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let system = nexusrt::ActorSystem::new(SystemConfig::default());
                let pid = system.spawn(Props::from_producer(|| EchoActor));
                for _ in 0..100 {
                    system.tell(&pid, Ping).await;
                }
            })
        });
    });
}

criterion_group!(benches, bench_single_spawn, bench_batch_spawn, bench_message_throughput);
criterion_main!(benches);
