use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use aws_sdk_cloudfront::types::{
    CertificateSource, CookiePreference, DefaultCacheBehavior, DistributionConfig,
    ForwardedValues, ItemSelection, MinimumProtocolVersion, Origin, Origins, PriceClass,
    S3OriginConfig, TrustedSigners, ViewerCertificate, ViewerProtocolPolicy,
};
use aws_sdk_s3::primitives::ByteStream;
use tokio::runtime::Runtime;

use crate::error::{Error, ErrorKind, Result, Chainable};
use crate::format::Source;
use crate::publish::PublishSink;

fn remote<E>(error: E) -> Error
    where E: std::error::Error + Send + Sync + 'static
{
    Error::from_std(error).with_kind(ErrorKind::Remote)
}

/// Publishes to S3 and CloudFront using the default AWS credential chain.
///
/// Calls block on a private current-thread runtime. Distributions are created
/// without geo restrictions, which is CloudFront's default when none are given.
#[derive(derive_more::Debug)]
pub struct S3Sink {
    #[debug(ignore)]
    runtime: Runtime,
    s3: aws_sdk_s3::Client,
    cloudfront: aws_sdk_cloudfront::Client,
}

impl S3Sink {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .chain_with(|| error!("failed to start async runtime"))?;

        let config = runtime.block_on(aws_config::load_from_env());
        Ok(S3Sink {
            s3: aws_sdk_s3::Client::new(&config),
            cloudfront: aws_sdk_cloudfront::Client::new(&config),
            runtime,
        })
    }

    fn distribution_config(bucket: &str, origin_domain: &str) -> Result<DistributionConfig> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();

        let cache_behavior = DefaultCacheBehavior::builder()
            .target_origin_id(bucket)
            .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
            .trusted_signers(TrustedSigners::builder().enabled(false).quantity(0).build().map_err(remote)?)
            .forwarded_values(ForwardedValues::builder()
                .query_string(false)
                .cookies(CookiePreference::builder().forward(ItemSelection::None).build().map_err(remote)?)
                .build()
                .map_err(remote)?)
            .min_ttl(0)
            .build()
            .map_err(remote)?;

        let origin = Origin::builder()
            .id(bucket)
            .domain_name(origin_domain)
            .s3_origin_config(S3OriginConfig::builder().origin_access_identity("").build().map_err(remote)?)
            .build()
            .map_err(remote)?;

        let certificate = ViewerCertificate::builder()
            .cloud_front_default_certificate(true)
            .minimum_protocol_version(MinimumProtocolVersion::TlSv12016)
            .certificate_source(CertificateSource::Cloudfront)
            .build();

        DistributionConfig::builder()
            .caller_reference(format!("lcb-website-{}", now.as_secs()))
            .comment(format!("CloudFront distribution for S3 bucket {bucket}"))
            .enabled(true)
            .default_cache_behavior(cache_behavior)
            .origins(Origins::builder().quantity(1).items(origin).build().map_err(remote)?)
            .price_class(PriceClass::PriceClass100)
            .default_root_object("index.html")
            .viewer_certificate(certificate)
            .build()
            .map_err(remote)
    }
}

impl PublishSink for S3Sink {
    fn put_object(&self, bucket: &str, key: &str, path: &Path, content_type: &str) -> Result<()> {
        let body = ByteStream::from(path.read()?);
        let request = self.s3.put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send();

        self.runtime.block_on(request).map_err(remote)?;
        Ok(())
    }

    fn find_distribution(&self, origin_domain: &str) -> Result<Option<String>> {
        let mut marker = None;
        loop {
            let request = self.cloudfront.list_distributions().set_marker(marker.take()).send();
            let page = self.runtime.block_on(request)
                .map_err(remote)
                .chain_with(|| error!("failed to list distributions"))?;

            let Some(list) = page.distribution_list() else {
                return Ok(None);
            };

            for distribution in list.items() {
                let origins = distribution.origins().map(|o| o.items()).unwrap_or_default();
                if origins.iter().any(|origin| origin.domain_name() == origin_domain) {
                    return Ok(Some(distribution.id().to_string()));
                }
            }

            match list.next_marker() {
                Some(next) if list.is_truncated() => marker = Some(next.to_string()),
                _ => return Ok(None),
            }
        }
    }

    fn create_distribution(&self, bucket: &str, origin_domain: &str) -> Result<String> {
        let config = Self::distribution_config(bucket, origin_domain)?;
        let request = self.cloudfront.create_distribution().distribution_config(config).send();
        let response = self.runtime.block_on(request).map_err(remote)?;
        let distribution = response.distribution()
            .ok_or_else(|| error!("distribution missing from response").with_kind(ErrorKind::Remote))?;

        tracing::info!(
            id = distribution.id(),
            domain = distribution.domain_name(),
            "created distribution"
        );

        Ok(distribution.id().to_string())
    }
}
