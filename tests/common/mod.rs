#![allow(dead_code, unused_imports)]

pub use csspipe_test_utils::builders::PipelineConfigBuilder;
pub use csspipe_test_utils::fake_backend::{FakeBackend, report_with_dependencies};
pub use csspipe_test_utils::{init_tracing, with_timeout};

use csspipe::fs::mock::MockFileSystem;
use csspipe::pipeline::Pipeline;

/// Pipeline rooted at `.` over the default config, for mock file system tests.
pub fn default_pipeline() -> Pipeline {
    pipeline_for(PipelineConfigBuilder::new("."))
}

pub fn pipeline_for(builder: PipelineConfigBuilder) -> Pipeline {
    Pipeline::from_config(&builder.build()).expect("pipeline from valid config")
}

/// Mock project with `src/index.css` set to `source`.
pub fn project(source: &str) -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("src/index.css", source);
    fs
}
