use anyhow::Result;
use qiniu_post_policy::{
    ConditionKey, ConditionMatch, PostPolicy, AWS_V4_SIGNATURE_ALGORITHM,
};
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "post_policy", about = "An example of PostPolicy")]
struct Opt {
    #[structopt(long)]
    bucket: String,

    #[structopt(long, default_value = "")]
    prefix: String,

    #[structopt(long)]
    acl: Option<String>,

    #[structopt(long, default_value = "0")]
    min_size: u64,

    #[structopt(long, default_value = "10485760")]
    max_size: u64,

    #[structopt(short, long, default_value = "3600")]
    lifetime_s: u64,

    #[structopt(long)]
    base64: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut policy = PostPolicy::new_with_lifetime(Duration::from_secs(opt.lifetime_s));
    policy.set_condition(ConditionKey::BUCKET, opt.bucket, ConditionMatch::Exact)?;
    if opt.prefix.is_empty() {
        policy.set_condition(ConditionKey::KEY, "", ConditionMatch::Any)?;
    } else {
        policy.set_condition(ConditionKey::KEY, opt.prefix, ConditionMatch::StartsWith)?;
    }
    if let Some(acl) = opt.acl {
        policy.set_condition(ConditionKey::ACL, acl, ConditionMatch::Exact)?;
    }
    policy
        .set_range_condition(
            ConditionKey::CONTENT_LENGTH_RANGE,
            opt.min_size,
            opt.max_size,
        )
        .set_condition(
            ConditionKey::AMZ_ALGORITHM,
            AWS_V4_SIGNATURE_ALGORITHM,
            ConditionMatch::Exact,
        )?;

    if opt.base64 {
        println!("{}", policy.to_base64()?);
    } else {
        println!("{}", policy.to_json()?);
    }
    Ok(())
}
