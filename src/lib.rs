pub mod math {
    pub mod tridiagonal;
}

pub mod transform {
    pub mod calibration;
    pub mod coordinatetransform;
    pub mod splinetransform;
    pub mod supplementarydata;
    pub mod transformerror;
}
