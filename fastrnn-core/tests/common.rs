use fastrnn_core::tensor::from_vec;
use fastrnn_core::Tensor;

// Each integration test binary uses a different subset of these helpers.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn tensor(data: Vec<f64>, shape: &[usize]) -> Tensor {
    from_vec(data, shape).expect("Test tensor creation failed")
}

/// A file name in the temp dir unique to this process and `tag`.
#[allow(dead_code)]
pub fn temp_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("fastrnn-{}-{}.json", tag, std::process::id()))
}
