// Headers attached to signed requests.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

// Env values used for default credential resolution.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_PROFILE: &str = "AWS_PROFILE";
pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

// Keys inside shared credentials file profiles.
pub const INI_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const INI_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const INI_SESSION_TOKEN: &str = "aws_session_token";
