use alloc::string::String;

use thiserror_no_std::Error;

use crate::storage::Credentials;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form body is not a valid credential submission")]
    InvalidFormBody,
    #[error("SSID or password is longer than a station accepts")]
    FieldTooLong,
}

/// Parses the portal's `ssid=..&password=..` submission.
///
/// Fields are positional: the first `&`-separated element is the SSID and
/// the second the password, whatever their keys. A value is the text
/// between the first and second `=` of its element. `+` becomes a space;
/// percent escapes are left as written. Values longer than
/// [`MAX_SSID_LEN`](crate::storage::MAX_SSID_LEN) or
/// [`MAX_PASSWORD_LEN`](crate::storage::MAX_PASSWORD_LEN) bytes are rejected.
pub fn parse_credentials(body: &[u8]) -> Result<Credentials, FormError> {
    let body = core::str::from_utf8(body).map_err(|_| FormError::InvalidFormBody)?;

    let mut elements = body.split('&');
    let (Some(ssid), Some(password)) = (elements.next(), elements.next()) else {
        return Err(FormError::InvalidFormBody);
    };

    let credentials = Credentials {
        ssid: field_value(ssid)?,
        password: field_value(password)?,
    };
    if !credentials.fits_limits() {
        return Err(FormError::FieldTooLong);
    }
    Ok(credentials)
}

fn field_value(element: &str) -> Result<String, FormError> {
    element
        .split('=')
        .nth(1)
        .map(|value| value.replace('+', " "))
        .ok_or(FormError::InvalidFormBody)
}
