use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReshapeError {
    #[error("Unknown attribute `{0}`")]
    UnknownAttribute(String),

    #[error("Invalid pixel coordinate [{lng}, {lat}]")]
    InvalidCoordinate { lng: f64, lat: f64 },
}
