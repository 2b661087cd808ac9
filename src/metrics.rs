use std::sync::LazyLock;

use prometheus::*;

static METRIC_RESOLUTION_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "presence_resolution_count",
        "count of the resolved face embeddings",
        &["outcome"]
    )
    .unwrap()
});

static METRIC_IMAGE_COUNT: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("presence_image_count", "count of the processed images").unwrap()
});

static METRIC_NEAREST_DISTANCE: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!(
        "presence_nearest_distance",
        "distance between an embedding and its nearest known face",
        (1..=20).map(|x| x as f64 * 0.05).collect()
    )
    .unwrap()
});

/// 增加识别结果计数
pub fn inc_resolution(outcome: &str) {
    METRIC_RESOLUTION_COUNT.with_label_values(&[outcome]).inc();
}

pub fn inc_image_count() {
    METRIC_IMAGE_COUNT.inc();
}

/// 记录最近邻距离
pub fn observe_nearest_distance(distance: f64) {
    METRIC_NEAREST_DISTANCE.observe(distance);
}

/// 将当前所有指标推送到 prometheus pushgateway
///
/// NOTE: 这是阻塞操作，在异步上下文中需要放到 spawn_blocking 中执行
pub fn push(url: &str, instance: &str) -> Result<()> {
    push_metrics(
        "presence",
        labels! {
            "instance".to_string() => instance.to_string(),
        },
        url,
        gather(),
        None,
    )
}
