pub mod runner;

pub use searchbench_http::{
    ClientOptions, Error as HttpError, HttpClient, HttpResponse, HttpTransportErrorKind,
    Result as HttpResult, Uri,
};
