use thiserror::Error;

use crate::capture::DeviceError;
use crate::classifier::ClassifyError;

#[derive(Error, Debug)]
pub enum TrashmonError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("도감에 없는 몬스터예요: id={0}")]
    NotFound(u64),

    #[error("도감 파일이 손상되었어요: {0}")]
    StoreCorrupted(String),

    #[error("도감 저장 실패: {0}")]
    Persistence(String),

    #[error("이미지 처리 오류: {0}")]
    Image(String),

    #[error("카메라 오류: {0}")]
    Device(#[from] DeviceError),

    #[error("분류 오류: {0}")]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Common(#[from] trashmon_common::Error),

    #[error("JSON 해석 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrashmonError>;
