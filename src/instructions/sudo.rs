//! `SELFDESTRUCT`: EIP-2929 cold-beneficiary surcharge, then the
//! EIP-150/Tangerine-Whistle new-account surcharge, via direct `Host`
//! calls. Balance transfer itself is the host's responsibility — this
//! trait only models `self_destruct` as a single opaque call.

use crate::common::{u256_to_address, ErrorKind, Revision, Status};
use crate::gas::ADDITIONAL_COLD_ACCOUNT_ACCESS_COST;
use crate::host::{AccessStatus, Host};
use crate::interpreter::ExecutionContext;

/// Gas charged post-Tangerine-Whistle when the beneficiary account does
/// not yet exist and the transfer is nonzero.
const NEW_ACCOUNT_COST: u64 = 25000;

pub(crate) fn selfdestruct<H: Host>(ctx: &mut ExecutionContext<'_>, host: &mut H) -> Result<(), ErrorKind> {
    if ctx.params.is_static {
        return Err(ErrorKind::WriteProtection);
    }

    let beneficiary = u256_to_address(ctx.stack.pop()?);

    if ctx.params.revision >= Revision::Berlin {
        if host.access_account(beneficiary) == AccessStatus::Cold {
            if !ctx.consume_gas(ADDITIONAL_COLD_ACCOUNT_ACCESS_COST as u64) {
                return Ok(());
            }
        }
    }

    let sends_value = !host.get_balance(ctx.params.recipient).is_zero();
    if sends_value && !host.account_exists(beneficiary) {
        if !ctx.consume_gas(NEW_ACCOUNT_COST) {
            return Ok(());
        }
    }

    host.self_destruct(ctx.params.recipient, beneficiary);
    ctx.status = Status::Suicided;
    Ok(())
}
