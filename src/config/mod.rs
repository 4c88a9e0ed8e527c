pub mod settings;

pub use settings::{
    AppConfig, BootstrapSettings, FitSettings, GradientDescentSettings, NewtonSettings,
    QuasiNewtonSettings, ScaleSettings,
};
