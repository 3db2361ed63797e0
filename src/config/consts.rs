// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Names of the ambient attributes every job provides without a producing processor.

/// Per-job working directory
pub const JOB_DIRECTORY: &str = "tempTaskDirectory";
/// Provider of HTTP request factories (proxies, credentials)
pub const HTTP_REQUEST_FACTORY: &str = "clientHttpRequestFactoryProvider";
/// Handle on the template being rendered
pub const TEMPLATE: &str = "template";
pub const PDF_CONFIG: &str = "pdfConfig";
pub const OUTPUT_FORMAT: &str = "outputFormat";
pub const JOB_ID: &str = "jobId";
pub const LOCALE: &str = "locale";
/// Log correlation context of the job
pub const MDC_CONTEXT: &str = "mdcContext";
pub const REQUEST_HEADERS: &str = "requestHeaders";

/// Ambient names are never prefixed by the attribute resolver.
pub const AMBIENT_ATTRIBUTES: [&str; 9] = [
    JOB_DIRECTORY,
    HTTP_REQUEST_FACTORY,
    TEMPLATE,
    PDF_CONFIG,
    OUTPUT_FORMAT,
    JOB_ID,
    LOCALE,
    MDC_CONTEXT,
    REQUEST_HEADERS,
];

/// Fallback when the available parallelism cannot be detected
pub const DEFAULT_CONCURRENCY: usize = 4;
