//! Fixed-rate, fixed-schedule mortgage formulary.
//!
//! All quantities are yearly: `mortgage_interest_rate` is a per-period
//! fractional rate and `mortgage_duration` a (possibly fractional) period
//! count. Every function is pure; violated preconditions surface as
//! [`MortgageError::DomainError`] instead of NaN or infinities.

pub mod compounding;
pub mod rate_search;

use serde::Serialize;

use crate::config::{Compounding, ModelConfig};
use crate::error::MortgageError;
use crate::registry::Output;
use crate::types::{Money, Rate, Years};
use crate::MortgageResult;

/// Amortisation state of a loan at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleSnapshot {
    pub duration: Years,
    pub home_price: Money,
    pub escrow_expense: Money,
    /// Payment net of escrow, i.e. the amortising part.
    pub corrected_payment: Money,
    pub principal_residual: Money,
}

#[derive(Debug, Clone)]
pub struct MortgageModel {
    config: ModelConfig,
    include_escrow: bool,
    escrow_rate: Rate,
}

impl MortgageModel {
    pub fn new(config: ModelConfig) -> MortgageResult<Self> {
        config.validate()?;
        let include_escrow = config.escrow_rate.is_some();
        let escrow_rate = config.escrow_rate.unwrap_or_default();
        Ok(Self {
            config,
            include_escrow,
            escrow_rate,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn includes_escrow(&self) -> bool {
        self.include_escrow
    }

    pub fn compounding(&self) -> Compounding {
        self.config.compounding
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Evaluate `output` with `args` in the order of `output.dependencies()`.
    pub fn evaluate(&self, output: Output, args: &[f64]) -> MortgageResult<f64> {
        let expected = output.dependencies().len();
        if args.len() != expected {
            return Err(MortgageError::InvalidInput {
                field: output.name().to_string(),
                reason: format!("expected {expected} arguments, got {}", args.len()),
            });
        }

        let value = match output {
            Output::MortgagePayment => self.mortgage_payment(args[0], args[1], args[2], args[3]),
            Output::MortgagePrincipal => self.mortgage_principal(args[0], args[1], args[2], args[3]),
            Output::MortgageInterestRate => {
                self.mortgage_interest_rate(args[0], args[1], args[2], args[3])
            }
            Output::MortgageDuration => self.mortgage_duration(args[0], args[1], args[2], args[3]),
            Output::MortgageInterest => self.mortgage_interest(args[0], args[1], args[2], args[3]),
            Output::MortgageEscrow => self.mortgage_escrow(args[0], args[1], args[2], args[3]),
            Output::Mortgage => self.mortgage(args[0], args[1], args[2], args[3]),
            Output::TotalCost => self.total_cost(args[0], args[1], args[2], args[3]),
            Output::PropertyValue => self.property_value(args[0], args[1], args[2], args[3]),
            Output::MortgagePrincipalResidual => {
                self.mortgage_principal_residual(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgagePrincipalPaid => {
                self.mortgage_principal_paid(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgageInterestResidual => {
                self.mortgage_interest_residual(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgageInterestPaid => {
                self.mortgage_interest_paid(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgageEscrowResidual => {
                self.mortgage_escrow_residual(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgageEscrowPaid => {
                self.mortgage_escrow_paid(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgageResidual => {
                self.mortgage_residual(args[0], args[1], args[2], args[3], args[4])
            }
            Output::MortgagePaid => self.mortgage_paid(args[0], args[1], args[2], args[3], args[4]),
            Output::TotalCostResidual => {
                self.total_cost_residual(args[0], args[1], args[2], args[3], args[4])
            }
            Output::TotalCostPaid => {
                self.total_cost_paid(args[0], args[1], args[2], args[3], args[4])
            }
            Output::AccruedCosts => self.accrued_costs(args[0], args[1], args[2], args[3], args[4]),
            Output::HomePurchaseTotalReturn => {
                self.home_purchase_total_return(args[0], args[1], args[2], args[3], args[4])
            }
            Output::HomePurchaseNetReturn => {
                self.home_purchase_net_return(args[0], args[1], args[2], args[3], args[4])
            }
            Output::NoHomePurchaseTotalReturn => {
                self.no_home_purchase_total_return(args[0], args[1], args[2], args[3], args[4])
            }
        }?;

        finite(output.name(), value)
    }

    // -----------------------------------------------------------------------
    // Building blocks
    // -----------------------------------------------------------------------

    pub fn home_price(&self, downpayment: Rate, mortgage_principal: Money) -> MortgageResult<Money> {
        downpayment_fraction("home_price", downpayment)?;
        Ok(mortgage_principal / (1.0 - downpayment))
    }

    /// Yearly escrow, zero when the model carries no escrow rate. The
    /// downpayment is checked either way.
    pub fn escrow_expense(
        &self,
        downpayment: Rate,
        mortgage_principal: Money,
    ) -> MortgageResult<Money> {
        let home_price = self.home_price(downpayment, mortgage_principal)?;
        if !self.include_escrow {
            return Ok(0.0);
        }
        Ok(self.escrow_rate * home_price)
    }

    fn corrected_payment(
        &self,
        function: &str,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
    ) -> MortgageResult<Money> {
        let corrected = mortgage_payment - self.escrow_expense(downpayment, mortgage_principal)?;
        if corrected <= 0.0 {
            return Err(MortgageError::domain(
                function,
                format!("payment net of escrow must be positive (got {corrected})"),
            ));
        }
        Ok(corrected)
    }

    // -----------------------------------------------------------------------
    // Core relationships
    // -----------------------------------------------------------------------

    /// Yearly payment amortising `mortgage_principal`, escrow included.
    pub fn mortgage_payment(
        &self,
        downpayment: Rate,
        mortgage_duration: Years,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Money> {
        const FN: &str = "mortgage_payment";
        positive_rate(FN, mortgage_interest_rate)?;
        positive_duration(FN, mortgage_duration)?;
        let growth = self
            .compounding()
            .growth_factor(mortgage_interest_rate, mortgage_duration);
        let amortising =
            mortgage_interest_rate * mortgage_principal * growth / (growth - 1.0);
        finite(FN, amortising + self.escrow_expense(downpayment, mortgage_principal)?)
    }

    /// Principal a payment can service; inverse of [`Self::mortgage_payment`].
    ///
    /// Escrow scales with the principal, so it enters the denominator.
    pub fn mortgage_principal(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_duration: Years,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Money> {
        const FN: &str = "mortgage_principal";
        positive_rate(FN, mortgage_interest_rate)?;
        positive_duration(FN, mortgage_duration)?;
        downpayment_fraction(FN, downpayment)?;
        let compounding = self.compounding();
        let growth = compounding.growth_factor(mortgage_interest_rate, mortgage_duration);
        let accumulation =
            compounding.accumulation_factor(mortgage_interest_rate, mortgage_duration);
        let escrow_rate = if self.include_escrow {
            self.escrow_rate
        } else {
            0.0
        };
        let price_per_principal = 1.0 / (1.0 - downpayment);
        finite(
            FN,
            mortgage_payment * accumulation
                / (growth + price_per_principal * accumulation * escrow_rate),
        )
    }

    /// Interest rate implied by a payment, resolved to
    /// [`rate_search::RATE_STEP`].
    pub fn mortgage_interest_rate(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_duration: Years,
        mortgage_principal: Money,
    ) -> MortgageResult<Rate> {
        const FN: &str = "mortgage_interest_rate";
        positive_duration(FN, mortgage_duration)?;
        let corrected =
            self.corrected_payment(FN, downpayment, mortgage_payment, mortgage_principal)?;
        rate_search::first_crossing(
            self.compounding(),
            mortgage_principal,
            corrected,
            mortgage_duration,
        )
        .ok_or_else(|| {
            MortgageError::domain(
                FN,
                format!(
                    "no rate up to {} leaves a positive balance",
                    f64::from(rate_search::MAX_RATE_STEPS) * rate_search::RATE_STEP
                ),
            )
        })
    }

    /// Years needed for a payment to retire the principal.
    pub fn mortgage_duration(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Years> {
        const FN: &str = "mortgage_duration";
        positive_rate(FN, mortgage_interest_rate)?;
        let corrected =
            self.corrected_payment(FN, downpayment, mortgage_payment, mortgage_principal)?;
        let interest_only = mortgage_interest_rate * mortgage_principal;
        if corrected <= interest_only {
            return Err(MortgageError::domain(
                FN,
                format!(
                    "payment net of escrow ({corrected}) must exceed the first year's interest ({interest_only})"
                ),
            ));
        }
        let ratio = corrected / (corrected - interest_only);
        finite(
            FN,
            ratio.ln() / self.compounding().log_growth(mortgage_interest_rate),
        )
    }

    /// Interest paid over the life of the loan.
    pub fn mortgage_interest(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Money> {
        let duration = self.mortgage_duration(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
        )?;
        let corrected = self.corrected_payment(
            "mortgage_interest",
            downpayment,
            mortgage_payment,
            mortgage_principal,
        )?;
        Ok(corrected * duration - mortgage_principal)
    }

    /// Escrow paid over the life of the loan.
    pub fn mortgage_escrow(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Money> {
        let duration = self.mortgage_duration(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
        )?;
        Ok(duration * self.escrow_expense(downpayment, mortgage_principal)?)
    }

    /// Every scheduled payment over the life of the loan.
    pub fn mortgage(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Money> {
        let duration = self.mortgage_duration(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
        )?;
        Ok(duration * mortgage_payment)
    }

    fn upfront_cash(&self, downpayment: Rate, mortgage_principal: Money) -> MortgageResult<Money> {
        let home_price = self.home_price(downpayment, mortgage_principal)?;
        Ok(downpayment * home_price + self.config.closing_costs_rate * mortgage_principal)
    }

    /// Downpayment, closing costs and every scheduled payment.
    pub fn total_cost(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
    ) -> MortgageResult<Money> {
        let payments = self.mortgage(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
        )?;
        Ok(self.upfront_cash(downpayment, mortgage_principal)? + payments)
    }

    pub fn property_value(
        &self,
        downpayment: Rate,
        mortgage_principal: Money,
        property_value_growth_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        const FN: &str = "property_value";
        let home_price = self.home_price(downpayment, mortgage_principal)?;
        if property_value_growth_rate <= -1.0 {
            return Err(MortgageError::domain(FN, "growth rate must exceed -100%"));
        }
        finite(
            FN,
            home_price * Compounding::Discrete.growth_factor(property_value_growth_rate, time),
        )
    }

    // -----------------------------------------------------------------------
    // As-of-time outputs
    // -----------------------------------------------------------------------

    /// Amortisation state at `time`; fails unless `0 <= time <= duration`.
    pub fn schedule_at(
        &self,
        function: &str,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<ScheduleSnapshot> {
        let duration = self.mortgage_duration(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
        )?;
        if time < 0.0 || time > duration {
            return Err(MortgageError::domain(
                function,
                format!("0 <= time <= duration (time {time}, duration {duration})"),
            ));
        }
        let home_price = self.home_price(downpayment, mortgage_principal)?;
        let escrow_expense = self.escrow_expense(downpayment, mortgage_principal)?;
        let corrected_payment = mortgage_payment - escrow_expense;
        let principal_residual = self.compounding().projected_balance(
            mortgage_principal,
            corrected_payment,
            mortgage_interest_rate,
            time,
        );
        Ok(ScheduleSnapshot {
            duration,
            home_price,
            escrow_expense,
            corrected_payment,
            principal_residual,
        })
    }

    pub fn mortgage_principal_residual(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_principal_residual",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(s.principal_residual)
    }

    pub fn mortgage_principal_paid(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_principal_paid",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(mortgage_principal - s.principal_residual)
    }

    /// Interest still owed: remaining amortising payments minus remaining principal.
    pub fn mortgage_interest_residual(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_interest_residual",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok((s.duration - time) * s.corrected_payment - s.principal_residual)
    }

    pub fn mortgage_interest_paid(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_interest_paid",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(time * s.corrected_payment - (mortgage_principal - s.principal_residual))
    }

    pub fn mortgage_escrow_residual(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_escrow_residual",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok((s.duration - time) * s.escrow_expense)
    }

    pub fn mortgage_escrow_paid(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_escrow_paid",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(time * s.escrow_expense)
    }

    pub fn mortgage_residual(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let s = self.schedule_at(
            "mortgage_residual",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok((s.duration - time) * mortgage_payment)
    }

    pub fn mortgage_paid(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        self.schedule_at(
            "mortgage_paid",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(time * mortgage_payment)
    }

    /// Total cost not yet paid at `time`: the remaining scheduled payments.
    pub fn total_cost_residual(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let total = self.total_cost(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
        )?;
        let paid = self.total_cost_paid(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(total - paid)
    }

    /// Upfront cash plus the payments made up to `time`.
    pub fn total_cost_paid(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        self.schedule_at(
            "total_cost_paid",
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(self.upfront_cash(downpayment, mortgage_principal)? + time * mortgage_payment)
    }

    /// Cash spent by `time`, closing costs charged on the home price.
    ///
    /// Not bounded by the duration: payments keep accruing past payoff.
    pub fn accrued_costs(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        _mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let home_price = self.home_price(downpayment, mortgage_principal)?;
        Ok(downpayment * home_price
            + self.config.closing_costs_rate * home_price
            + time * mortgage_payment)
    }

    /// Sale proceeds at `time`, net of selling costs.
    pub fn home_purchase_total_return(
        &self,
        downpayment: Rate,
        _mortgage_payment: Money,
        mortgage_principal: Money,
        _mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let value = self.property_value(
            downpayment,
            mortgage_principal,
            self.config.property_value_growth_rate,
            time,
        )?;
        Ok(value * (1.0 - self.config.closing_costs_rate))
    }

    /// Equity realised by selling at `time`: proceeds minus the outstanding principal.
    pub fn home_purchase_net_return(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        let residual = self.mortgage_principal_residual(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        let proceeds = self.home_purchase_total_return(
            downpayment,
            mortgage_payment,
            mortgage_principal,
            mortgage_interest_rate,
            time,
        )?;
        Ok(proceeds - residual)
    }

    /// Wealth at `time` when renting instead and investing the upfront cash
    /// plus the yearly payment-minus-rent difference at the market return.
    pub fn no_home_purchase_total_return(
        &self,
        downpayment: Rate,
        mortgage_payment: Money,
        mortgage_principal: Money,
        _mortgage_interest_rate: Rate,
        time: Years,
    ) -> MortgageResult<Money> {
        const FN: &str = "no_home_purchase_total_return";
        let market = self.config.market_rate_of_return;
        if market == 0.0 || market <= -1.0 {
            return Err(MortgageError::domain(
                FN,
                format!("market rate of return must be non-zero and above -100% (got {market})"),
            ));
        }
        let home_price = self.home_price(downpayment, mortgage_principal)?;
        let rent = self.property_value(
            0.0,
            home_price / self.config.price_to_rent_ratio,
            self.config.property_value_growth_rate,
            time,
        )?;
        let initial_capital =
            downpayment * home_price + self.config.closing_costs_rate * home_price;
        let yearly_investment = mortgage_payment - rent;

        let base = 1.0 + market;
        let growth = Compounding::Discrete.growth_factor(market, time);
        let from_initial = initial_capital * growth;
        let from_yearly = yearly_investment * (base / market) * (growth - 1.0);
        finite(FN, from_initial + from_yearly)
    }
}

fn downpayment_fraction(function: &str, downpayment: Rate) -> MortgageResult<()> {
    if (0.0..1.0).contains(&downpayment) {
        Ok(())
    } else {
        Err(MortgageError::domain(
            function,
            format!("0 <= downpayment < 1 (got {downpayment})"),
        ))
    }
}

fn positive_rate(function: &str, rate: Rate) -> MortgageResult<()> {
    if rate > 0.0 {
        Ok(())
    } else {
        Err(MortgageError::domain(
            function,
            format!("mortgage_interest_rate > 0 (got {rate})"),
        ))
    }
}

fn positive_duration(function: &str, duration: Years) -> MortgageResult<()> {
    if duration > 0.0 {
        Ok(())
    } else {
        Err(MortgageError::domain(
            function,
            format!("mortgage_duration > 0 (got {duration})"),
        ))
    }
}

fn finite(function: &str, value: f64) -> MortgageResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MortgageError::domain(function, "result is not a finite number"))
    }
}
