use criterion::{BenchmarkId, Criterion, Throughput, black_box};
use spark_iobuf::{ChunkBufferPool, ChunkList, RingBuffer, SizeClassPool};
use std::{env, sync::Arc, time::Duration};

/// 稳态读写：缓冲容量足够，循环写入一帧后立即读出。
///
/// # 设计背景（Why）
/// - 连接建立后绝大多数时间处于稳态，此时读写只应是两次 `memcpy` 加游标运算；
///   任何额外分配或分支回归都会直接体现在这一组数字上。
///
/// # 逻辑解析（How）
/// - 预热阶段写入半帧、丢弃到只剩 1 字节：缓冲始终非空，游标不会被重置为 0，
///   之后每次迭代读写一整帧，游标在存储中滑动并周期性跨越回绕点。
fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer/steady_state");
    for frame in [64usize, 512, 4096] {
        group.throughput(Throughput::Bytes(frame as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frame), &frame, |b, &frame| {
            let mut ring = RingBuffer::new(frame * 2);
            ring.write(&vec![0u8; frame / 2]);
            ring.discard(frame / 2 - 1);
            let payload = vec![7u8; frame];
            let mut sink = vec![0u8; frame];
            b.iter(|| {
                ring.write(black_box(&payload));
                black_box(ring.read(&mut sink)).ok();
            });
        });
    }
    group.finish();
}

/// 扩容路径：从小容量开始持续写入，观察切片池复用对扩容成本的影响。
fn bench_growth(c: &mut Criterion) {
    let pool = Arc::new(SizeClassPool::new());
    c.bench_function("ring_buffer/grow_to_64k", |b| {
        let chunk = [1u8; 1024];
        b.iter(|| {
            let mut ring = RingBuffer::with_pool(0, pool.clone());
            for _ in 0..64 {
                ring.write(&chunk);
            }
            black_box(ring.cap())
        });
    });
}

/// 分块链表的写出路径：压入若干块、生成向量化视图、按字节确认写出进度。
fn bench_chunk_list_flush(c: &mut Criterion) {
    let pool = ChunkBufferPool::new();
    c.bench_function("chunk_list/push_peek_discard", |b| {
        let frame = [3u8; 1500];
        b.iter(|| {
            let mut list = ChunkList::with_pool(&pool);
            for _ in 0..8 {
                list.push_bytes_back(&frame);
            }
            let total: usize = list.peek_bytes_list().iter().map(|v| v.len()).sum();
            list.discard_bytes(black_box(total));
            black_box(list.bytes())
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_steady_state(&mut criterion);
    bench_growth(&mut criterion);
    bench_chunk_list_flush(&mut criterion);
    criterion.final_summary();
}
